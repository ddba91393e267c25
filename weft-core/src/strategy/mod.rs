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

//! The create/write/read strategy triad.
//!
//! Every registered type owns a [`Serializer`] bundling three independent
//! strategies:
//!
//! - [`CreateStrategy`] produces an instance, possibly consuming stream data
//!   (e.g. constructor arguments);
//! - [`WriteStrategy`] encodes a fully populated instance;
//! - [`ReadStrategy`] populates an instance that `create` produced.
//!
//! The split lets a type read its constructor arguments in `create` while a
//! generic field codec fills the rest in `read`. Closures with the matching
//! signature implement the traits, so a one-off strategy needs no new type.
//!
//! ```rust,ignore
//! let serializer = Serializer::<Ticket>::tagged_with(
//!     |input: &mut Input<'_>| Ok(Ticket::new(input.read::<String>()?)),
//!     Ticket::field_table()?,
//! );
//! ```

mod all_fields;
mod tagged;

pub use all_fields::AllFields;
pub use tagged::TaggedFields;

use crate::error::Error;
use crate::meta::FieldTable;
use crate::resolver::context::{Input, Output};
use std::fmt;
use std::sync::Arc;

pub trait CreateStrategy<T>: Send + Sync {
    fn create(&self, input: &mut Input<'_>) -> Result<T, Error>;
}

pub trait WriteStrategy<T>: Send + Sync {
    fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error>;
}

pub trait ReadStrategy<T>: Send + Sync {
    fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error>;
}

impl<T, F> CreateStrategy<T> for F
where
    F: Fn(&mut Input<'_>) -> Result<T, Error> + Send + Sync,
{
    fn create(&self, input: &mut Input<'_>) -> Result<T, Error> {
        self(input)
    }
}

impl<T, F> WriteStrategy<T> for F
where
    F: Fn(&T, &mut Output<'_>) -> Result<(), Error> + Send + Sync,
{
    fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error> {
        self(value, out)
    }
}

impl<T, F> ReadStrategy<T> for F
where
    F: Fn(&mut T, &mut Input<'_>) -> Result<(), Error> + Send + Sync,
{
    fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error> {
        self(value, input)
    }
}

/// Creates instances through `Default`, the zero-argument constructor.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCreate;

impl<T: Default> CreateStrategy<T> for DefaultCreate {
    #[inline(always)]
    fn create(&self, _input: &mut Input<'_>) -> Result<T, Error> {
        Ok(T::default())
    }
}

/// Writes and reads nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

impl<T> WriteStrategy<T> for NoOp {
    #[inline(always)]
    fn write(&self, _value: &T, _out: &mut Output<'_>) -> Result<(), Error> {
        Ok(())
    }
}

impl<T> ReadStrategy<T> for NoOp {
    #[inline(always)]
    fn read(&self, _value: &mut T, _input: &mut Input<'_>) -> Result<(), Error> {
        Ok(())
    }
}

/// Strategy handed to types registered without an explicit [`Serializer`].
///
/// Switch it between registration batches with
/// [`TypeRegistry::set_default_strategy`](crate::resolver::type_registry::TypeRegistry::set_default_strategy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DefaultStrategy {
    /// Fields by declared numeric tag; tolerant to added and removed fields.
    #[default]
    Tagged,
    /// Every field by name; a missing field fails the read.
    AllFields,
    /// Only `create` runs; nothing is written.
    Empty,
}

/// The strategy bundle of one registered type.
pub struct Serializer<T> {
    label: &'static str,
    create: Box<dyn CreateStrategy<T>>,
    write: Box<dyn WriteStrategy<T>>,
    read: Box<dyn ReadStrategy<T>>,
}

impl<T: 'static> Serializer<T> {
    pub fn new(
        create: impl CreateStrategy<T> + 'static,
        write: impl WriteStrategy<T> + 'static,
        read: impl ReadStrategy<T> + 'static,
    ) -> Self {
        Serializer {
            label: "custom",
            create: Box::new(create),
            write: Box::new(write),
            read: Box::new(read),
        }
    }

    /// Builds the serializer that `strategy` prescribes around a field table.
    pub fn for_strategy(
        strategy: DefaultStrategy,
        create: impl CreateStrategy<T> + 'static,
        fields: FieldTable<T>,
    ) -> Self {
        match strategy {
            DefaultStrategy::Tagged => Self::tagged_with(create, fields),
            DefaultStrategy::AllFields => Self::all_fields_with(create, fields),
            DefaultStrategy::Empty => Self::empty_with(create),
        }
    }

    pub fn tagged_with(create: impl CreateStrategy<T> + 'static, fields: FieldTable<T>) -> Self {
        let fields = Arc::new(fields);
        Serializer {
            label: "tagged",
            create: Box::new(create),
            write: Box::new(TaggedFields::new(Arc::clone(&fields))),
            read: Box::new(TaggedFields::new(fields)),
        }
    }

    pub fn all_fields_with(
        create: impl CreateStrategy<T> + 'static,
        fields: FieldTable<T>,
    ) -> Self {
        let fields = Arc::new(fields);
        Serializer {
            label: "all-fields",
            create: Box::new(create),
            write: Box::new(AllFields::new(Arc::clone(&fields))),
            read: Box::new(AllFields::new(fields)),
        }
    }

    pub fn empty_with(create: impl CreateStrategy<T> + 'static) -> Self {
        Serializer {
            label: "empty",
            create: Box::new(create),
            write: Box::new(NoOp),
            read: Box::new(NoOp),
        }
    }

    pub fn with_create(mut self, create: impl CreateStrategy<T> + 'static) -> Self {
        self.create = Box::new(create);
        self
    }

    pub fn with_write(mut self, write: impl WriteStrategy<T> + 'static) -> Self {
        self.write = Box::new(write);
        self
    }

    pub fn with_read(mut self, read: impl ReadStrategy<T> + 'static) -> Self {
        self.read = Box::new(read);
        self
    }

    pub fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline(always)]
    pub fn create(&self, input: &mut Input<'_>) -> Result<T, Error> {
        self.create.create(input)
    }

    #[inline(always)]
    pub fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error> {
        self.write.write(value, out)
    }

    #[inline(always)]
    pub fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error> {
        self.read.read(value, input)
    }
}

impl<T: Default + 'static> Serializer<T> {
    pub fn tagged(fields: FieldTable<T>) -> Self {
        Self::tagged_with(DefaultCreate, fields)
    }

    pub fn all_fields(fields: FieldTable<T>) -> Self {
        Self::all_fields_with(DefaultCreate, fields)
    }

    pub fn empty() -> Self {
        Self::empty_with(DefaultCreate)
    }
}

impl<T> fmt::Debug for Serializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("type", &std::any::type_name::<T>())
            .field("strategy", &self.label)
            .finish()
    }
}
