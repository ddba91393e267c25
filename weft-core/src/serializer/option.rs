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

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::NULL;

/// `None` is the NULL tag; `Some(v)` is written exactly like `v`.
impl<T: Persist> Persist for Option<T> {
    #[inline(always)]
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        match self {
            Some(value) => value.persist_write(out),
            None => {
                out.write_null();
                Ok(())
            }
        }
    }

    #[inline(always)]
    fn encodes_as_null(&self) -> bool {
        self.as_ref().map_or(true, T::encodes_as_null)
    }

    #[inline(always)]
    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        if tag == NULL {
            return Ok(None);
        }
        T::persist_read_tagged(input, tag).map(Some)
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        T::persist_type_id(registry)
    }
}
