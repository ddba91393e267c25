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

//! Encodable types.
//!
//! [`Persist`] is the one trait every encodable type implements. Registered
//! types additionally implement [`Object`], which hands the registry their
//! default [`Serializer`]; `#[derive(Weft)]` generates both.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::{TypeKind, TypeRegistry};
use crate::strategy::{DefaultStrategy, Serializer};

mod array;
mod catalog;
mod collection;
pub mod deferred;
mod enum_;
mod map;
mod option;
mod pair;
mod primitive;
mod shared;
mod value;
pub(crate) mod warmup;

pub use catalog::{catalog_serializer, Catalog};
pub use enum_::{enumeration_serializer, Enumeration};
pub use shared::{AsAny, Shared};
pub use value::{DynObject, Value};

pub trait Persist {
    /// Writes `[tag][payload]`.
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error>;

    /// Whether `persist_write` would emit nothing but the NULL tag. Arrays fold
    /// such elements into their null runs.
    #[inline(always)]
    fn encodes_as_null(&self) -> bool {
        false
    }

    /// Reads the payload after the caller consumed `tag`.
    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error>
    where
        Self: Sized;

    #[inline(always)]
    fn persist_read(input: &mut Input<'_>) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let tag = input.read_tag()?;
        Self::persist_read_tagged(input, tag)
    }

    /// Wire id written for values of this type; array component ids use it.
    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error>
    where
        Self: Sized;
}

/// A type the registry can hold a serializer for.
pub trait Object: Persist + Sized + 'static {
    const KIND: TypeKind = TypeKind::Object;

    fn type_name() -> &'static str {
        crate::util::short_type_name(std::any::type_name::<Self>())
    }

    /// The serializer `register` uses when none is given explicitly.
    fn default_serializer(strategy: DefaultStrategy) -> Result<Serializer<Self>, Error>;
}
