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

//! Maps: `[size:u16]` then every entry as a pair of key and value.

use super::collection::write_size;
use super::pair::{read_pair_tagged, write_pair};
use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::builtin;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

macro_rules! impl_map {
    ($($map:ident [$($bound:ident),*];)*) => {
        $(
            impl<K: Persist $(+ $bound)*, V: Persist> Persist for $map<K, V> {
                fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
                    out.write_builtin(builtin::MAP, |out| {
                        write_size(out, self.len())?;
                        for (key, value) in self {
                            write_pair(out, key, value)?;
                        }
                        Ok(())
                    })
                }

                fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
                    input.read_builtin(tag, builtin::MAP, |input| {
                        let size = input.reader.read_u16()?;
                        let mut map = $map::new();
                        for _ in 0..size {
                            let tag = input.read_tag()?;
                            let (key, value) = read_pair_tagged(input, tag, |input| {
                                Ok((input.read::<K>()?, input.read::<V>()?))
                            })?;
                            map.insert(key, value);
                        }
                        Ok(map)
                    })
                }

                fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
                    Ok(builtin::MAP)
                }
            }
        )*
    };
}

impl_map! {
    HashMap [Eq, Hash];
    BTreeMap [Ord];
}
