// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

/// Configuration of a [`Weft`](crate::weft::Weft) engine.
///
/// Shared by the engine and every [`Output`](crate::resolver::context::Output) and
/// [`Input`](crate::resolver::context::Input) it creates.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum nesting of non-primitive values in one stream. Cycles terminate
    /// through reference markers and never count against it.
    pub max_depth: u32,
    /// Emit a depth-indented `trace!` line for every value encoded or decoded.
    pub trace: bool,
    /// Capacity of freshly allocated pooled buffers.
    pub initial_buffer_capacity: usize,
    /// Fail a top-level decode that leaves unread bytes behind.
    pub reject_trailing_bytes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: 512,
            trace: false,
            initial_buffer_capacity: 512,
            reject_trailing_bytes: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline(always)]
    pub fn is_trace(&self) -> bool {
        self.trace
    }
}
