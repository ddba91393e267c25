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

//! Catalog types: a fixed set of canonical instances known at registration.
//!
//! A catalog entry is written as its key. Decoding looks the key up and
//! returns the canonical `&'static` instance, so identity survives a round
//! trip: `std::ptr::eq(decoded, original)`.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::{TypeKind, TypeRegistry};
use crate::serializer::{Object, Persist};
use crate::strategy::{DefaultStrategy, NoOp, Serializer};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

pub trait Catalog: Sized + Sync + 'static {
    type Key: Persist + Eq + Hash + Debug + Send + Sync + 'static;

    /// The canonical instances.
    fn entries() -> &'static [Self];

    /// The identifying key of an entry.
    fn key(&self) -> Self::Key;
}

/// Indexes the entries of `C` by key; two entries sharing a key is a
/// registration error.
pub fn catalog_serializer<C: Catalog>() -> Result<Serializer<&'static C>, Error> {
    let entries = C::entries();
    let mut index = HashMap::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let key = entry.key();
        if let Some(previous) = index.insert(key, position) {
            return Err(Error::registration(format!(
                "{}: entries {previous} and {position} share key {:?}",
                std::any::type_name::<C>(),
                entries[position].key()
            )));
        }
    }
    let create = move |input: &mut Input<'_>| -> Result<&'static C, Error> {
        let key = input.read::<C::Key>()?;
        match index.get(&key) {
            Some(&position) => Ok(&C::entries()[position]),
            None => crate::bail!(
                "no {} entry has key {:?}",
                std::any::type_name::<C>(),
                key
            ),
        }
    };
    let write = |entry: &&'static C, out: &mut Output<'_>| out.write(&entry.key());
    Ok(Serializer::new(create, write, NoOp).labelled("catalog"))
}

impl<C: Catalog> Persist for &'static C {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.write_object(self)
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        input.read_object::<Self>(tag)
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        registry.id_of::<Self>()
    }
}

impl<C: Catalog> Object for &'static C {
    const KIND: TypeKind = TypeKind::Catalog;

    fn type_name() -> &'static str {
        crate::util::short_type_name(std::any::type_name::<C>())
    }

    fn default_serializer(_: DefaultStrategy) -> Result<Serializer<Self>, Error> {
        catalog_serializer::<C>()
    }
}
