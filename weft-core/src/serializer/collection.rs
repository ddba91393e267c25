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

//! Lists and sets: `[size:u16]` then every element as a generic value.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::builtin;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;

/// Writes the `u16` size prefix of a collection or map.
pub(crate) fn write_size(out: &mut Output<'_>, len: usize) -> Result<(), Error> {
    let size = u16::try_from(len).map_err(|_| {
        Error::write_error(format!(
            "collection of {len} elements exceeds the limit of {}",
            u16::MAX
        ))
    })?;
    out.writer.write_u16(size);
    Ok(())
}

macro_rules! impl_collection {
    ($($coll:ident [$($bound:ident),*] => $id:path;)*) => {
        $(
            impl<T: Persist $(+ $bound)*> Persist for $coll<T> {
                fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
                    out.write_builtin($id, |out| {
                        write_size(out, self.len())?;
                        for element in self {
                            element.persist_write(out)?;
                        }
                        Ok(())
                    })
                }

                fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
                    input.read_builtin(tag, $id, |input| {
                        let size = input.reader.read_u16()?;
                        (0..size).map(|_| input.read::<T>()).collect()
                    })
                }

                fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
                    Ok($id)
                }
            }
        )*
    };
}

impl_collection! {
    Vec [] => builtin::LIST;
    VecDeque [] => builtin::LIST;
    HashSet [Eq, Hash] => builtin::SET;
    BTreeSet [Ord] => builtin::SET;
}
