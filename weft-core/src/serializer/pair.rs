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

//! Pairs: the PAIR marker, then the first and the second element as generic
//! values. Map entries are written the same way.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::builtin;

pub(crate) fn write_pair<A, B>(out: &mut Output<'_>, first: &A, second: &B) -> Result<(), Error>
where
    A: Persist + ?Sized,
    B: Persist + ?Sized,
{
    out.write_builtin(builtin::PAIR, |out| {
        first.persist_write(out)?;
        second.persist_write(out)
    })
}

/// Reads a pair whose tag was already read, handing both halves to `body`.
pub(crate) fn read_pair_tagged<R, F>(input: &mut Input<'_>, tag: u16, body: F) -> Result<R, Error>
where
    F: FnOnce(&mut Input<'_>) -> Result<R, Error>,
{
    input.read_builtin(tag, builtin::PAIR, body)
}

impl<A: Persist, B: Persist> Persist for (A, B) {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        write_pair(out, &self.0, &self.1)
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        read_pair_tagged(input, tag, |input| {
            let first = input.read::<A>()?;
            let second = input.read::<B>()?;
            Ok((first, second))
        })
    }

    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
        Ok(builtin::PAIR)
    }
}
