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

//! The type registry: a bijection between Rust types and wire ids.
//!
//! Registration happens once, before any stream is created; afterwards the
//! registry is only read, and one registry may serve any number of threads.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::serializer::Object;
use crate::strategy::{DefaultStrategy, Serializer};
use crate::types::{builtin, is_reserved, FIRST_APPLICATION_ID};
use crate::util::{is_closure_type_name, short_type_name};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Container markers the engine registers for itself.
    Builtin,
    /// Structs encoded through their create/write/read strategies.
    Object,
    /// Fieldless enums encoded by ordinal.
    Enumeration,
    /// Types with a fixed set of canonical instances, encoded by key.
    Catalog,
    /// Trait objects; never written themselves, only their subtypes are.
    Abstract,
}

type WriteValueFn = fn(&dyn Any, &mut Output<'_>) -> Result<(), Error>;
type ReadSharedFn = fn(&mut Input<'_>, u16) -> Result<Rc<dyn Any>, Error>;

/// Type-erased entry points of one registered object type, used wherever the
/// static type is not known: trait objects and dynamic [`Value`](crate::serializer::Value)s.
#[derive(Clone, Copy)]
pub struct Harness {
    write_value: WriteValueFn,
    write_cell: WriteValueFn,
    read_shared: ReadSharedFn,
}

impl Harness {
    fn of<T: Object>() -> Harness {
        Harness {
            write_value: write_value::<T>,
            write_cell: write_cell::<T>,
            read_shared: read_shared::<T>,
        }
    }

    /// Writes a `&T` passed as `&dyn Any`.
    #[inline(always)]
    pub fn write_value(&self, value: &dyn Any, out: &mut Output<'_>) -> Result<(), Error> {
        (self.write_value)(value, out)
    }

    /// Writes the content of a `RefCell<T>` (or a plain `T`) passed as `&dyn Any`.
    #[inline(always)]
    pub fn write_cell(&self, cell: &dyn Any, out: &mut Output<'_>) -> Result<(), Error> {
        (self.write_cell)(cell, out)
    }

    /// Decodes an instance into a fresh shared handle (`Rc<RefCell<T>>`).
    #[inline(always)]
    pub fn read_shared(&self, input: &mut Input<'_>, tag: u16) -> Result<Rc<dyn Any>, Error> {
        (self.read_shared)(input, tag)
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Harness")
    }
}

fn write_value<T: Object>(value: &dyn Any, out: &mut Output<'_>) -> Result<(), Error> {
    match value.downcast_ref::<T>() {
        Some(value) => out.write_object(value),
        None => Err(Error::write_error(format!(
            "harness of {} was handed another type",
            T::type_name()
        ))),
    }
}

fn write_cell<T: Object>(cell: &dyn Any, out: &mut Output<'_>) -> Result<(), Error> {
    // handles of immutable `Rc<T>` hold the value itself
    let Some(cell) = cell.downcast_ref::<RefCell<T>>() else {
        return write_value::<T>(cell, out);
    };
    let value = cell.try_borrow().map_err(|_| {
        Error::write_error(format!(
            "{} is mutably borrowed while being written",
            T::type_name()
        ))
    })?;
    out.write_object(&*value)
}

fn read_shared<T: Object>(input: &mut Input<'_>, tag: u16) -> Result<Rc<dyn Any>, Error> {
    let handle: Rc<dyn Any> = input.read_object_shared::<T>(tag)?;
    Ok(handle)
}

/// Turns a decoded subtype handle into a handle of its abstract type.
type Upcast<U> = Box<dyn Fn(Rc<dyn Any>) -> Option<Rc<RefCell<U>>> + Send + Sync>;

pub struct TypeRecord {
    id: u16,
    rust_type: TypeId,
    name: &'static str,
    kind: TypeKind,
    strategy: &'static str,
    // Serializer<T> of the registered T
    serializer: Option<Box<dyn Any + Send + Sync>>,
    harness: Option<Harness>,
}

impl TypeRecord {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn rust_type(&self) -> TypeId {
        self.rust_type
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Label of the serializer, e.g. `tagged` or `all-fields`.
    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn harness(&self) -> Option<&Harness> {
        self.harness.as_ref()
    }

    pub fn serializer<T: 'static>(&self) -> Option<&Serializer<T>> {
        self.serializer.as_ref()?.downcast_ref::<Serializer<T>>()
    }
}

impl fmt::Debug for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("strategy", &self.strategy)
            .finish()
    }
}

macro_rules! builtin_markers {
    ($($marker:ident => $id:path, $name:literal;)*) => {
        $(
            enum $marker {}
        )*

        fn builtin_records() -> Vec<TypeRecord> {
            vec![$(
                TypeRecord {
                    id: $id,
                    rust_type: TypeId::of::<$marker>(),
                    name: $name,
                    kind: TypeKind::Builtin,
                    strategy: "builtin",
                    serializer: None,
                    harness: None,
                },
            )*]
        }
    };
}

builtin_markers! {
    ArrayMarker => builtin::ARRAY, "array";
    ListMarker => builtin::LIST, "list";
    SetMarker => builtin::SET, "set";
    MapMarker => builtin::MAP, "map";
    PairMarker => builtin::PAIR, "pair";
}

pub struct TypeRegistry {
    records: Vec<TypeRecord>,
    by_id: HashMap<u16, usize>,
    by_type: HashMap<TypeId, usize>,
    // (abstract, concrete) -> Upcast<abstract>
    upcasts: HashMap<(TypeId, TypeId), Box<dyn Any + Send + Sync>>,
    default_strategy: DefaultStrategy,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry {
            records: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            upcasts: HashMap::new(),
            default_strategy: DefaultStrategy::default(),
        };
        for record in builtin_records() {
            registry.insert(record);
        }
        registry
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` with the serializer the active default strategy gives it.
    ///
    /// Without an explicit id, the lowest free application id is assigned.
    pub fn register<T: Object>(&mut self, id: Option<u16>) -> Result<u16, Error> {
        let serializer = T::default_serializer(self.default_strategy)?;
        self.register_with(id, serializer)
    }

    pub fn register_with<T: Object>(
        &mut self,
        id: Option<u16>,
        serializer: Serializer<T>,
    ) -> Result<u16, Error> {
        let id = self.check::<T>(id)?;
        let strategy = serializer.label();
        self.insert(TypeRecord {
            id,
            rust_type: TypeId::of::<T>(),
            name: T::type_name(),
            kind: T::KIND,
            strategy,
            serializer: Some(Box::new(serializer)),
            harness: Some(Harness::of::<T>()),
        });
        log::debug!(
            "registered {} as type id {id} ({:?}, {strategy})",
            T::type_name(),
            T::KIND
        );
        Ok(id)
    }

    /// Registers a trait object type, e.g. `dyn Shape`, as the abstract target
    /// of polymorphic fields.
    pub fn register_abstract<U: ?Sized + 'static>(&mut self, id: Option<u16>) -> Result<u16, Error> {
        let id = self.check::<U>(id)?;
        let name = short_type_name(std::any::type_name::<U>());
        self.insert(TypeRecord {
            id,
            rust_type: TypeId::of::<U>(),
            name,
            kind: TypeKind::Abstract,
            strategy: "abstract",
            serializer: None,
            harness: None,
        });
        log::debug!("registered abstract {name} as type id {id}");
        Ok(id)
    }

    /// Declares `C` a subtype of the abstract `U`.
    ///
    /// Both must already be registered. `upcast` is normally just `|c| c`.
    pub fn register_subtype<U: ?Sized + 'static, C: Object>(
        &mut self,
        upcast: fn(Rc<RefCell<C>>) -> Rc<RefCell<U>>,
    ) -> Result<(), Error> {
        let abstract_id = self.id_of::<U>()?;
        let concrete_id = self.id_of::<C>()?;
        if self.record_of::<U>()?.kind != TypeKind::Abstract {
            return Err(Error::registration(format!(
                "{} is not an abstract type",
                std::any::type_name::<U>()
            )));
        }
        let erased: Upcast<U> =
            Box::new(move |handle| handle.downcast::<RefCell<C>>().ok().map(upcast));
        let key = (TypeId::of::<U>(), TypeId::of::<C>());
        if self.upcasts.insert(key, Box::new(erased)).is_some() {
            return Err(Error::registration(format!(
                "{} is already a subtype of {}",
                C::type_name(),
                std::any::type_name::<U>()
            )));
        }
        log::debug!("type id {concrete_id} is a subtype of type id {abstract_id}");
        Ok(())
    }

    /// Changes the strategy given to types registered without a serializer and
    /// returns the previous one.
    pub fn set_default_strategy(&mut self, strategy: DefaultStrategy) -> DefaultStrategy {
        log::debug!(
            "default strategy {:?} -> {:?}",
            self.default_strategy,
            strategy
        );
        std::mem::replace(&mut self.default_strategy, strategy)
    }

    pub fn default_strategy(&self) -> DefaultStrategy {
        self.default_strategy
    }

    /// Wire id of `T`; an unregistered type is a configuration error.
    #[inline]
    pub fn id_of<T: ?Sized + 'static>(&self) -> Result<u16, Error> {
        self.record_of::<T>().map(|record| record.id)
    }

    pub fn record_of<T: ?Sized + 'static>(&self) -> Result<&TypeRecord, Error> {
        self.record_by_rust_type(TypeId::of::<T>())
            .ok_or_else(|| Error::unregistered_type(std::any::type_name::<T>()))
    }

    #[inline]
    pub fn record_by_rust_type(&self, rust_type: TypeId) -> Option<&TypeRecord> {
        self.by_type.get(&rust_type).map(|&i| &self.records[i])
    }

    #[inline]
    pub fn type_of(&self, id: u16) -> Option<&TypeRecord> {
        self.by_id.get(&id).map(|&i| &self.records[i])
    }

    /// Serializer and wire id of a registered object type.
    pub fn serializer_of<T: 'static>(&self) -> Result<(&Serializer<T>, u16), Error> {
        let record = self.record_of::<T>()?;
        match record.serializer::<T>() {
            Some(serializer) => Ok((serializer, record.id)),
            None => Err(Error::unregistered_type(format!(
                "{} is registered as {:?} and has no serializer",
                record.name, record.kind
            ))),
        }
    }

    /// Whether `rust_type` was declared a subtype of `U`.
    pub fn is_subtype<U: ?Sized + 'static>(&self, rust_type: TypeId) -> bool {
        self.upcasts.contains_key(&(TypeId::of::<U>(), rust_type))
    }

    pub fn upcast<U: ?Sized + 'static>(
        &self,
        handle: Rc<dyn Any>,
        rust_type: TypeId,
    ) -> Option<Rc<RefCell<U>>> {
        let upcast = self
            .upcasts
            .get(&(TypeId::of::<U>(), rust_type))?
            .downcast_ref::<Upcast<U>>()?;
        upcast(handle)
    }

    pub fn records(&self) -> impl Iterator<Item = &TypeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check<T: ?Sized + 'static>(&self, id: Option<u16>) -> Result<u16, Error> {
        let rust_name = std::any::type_name::<T>();
        if is_closure_type_name(rust_name) {
            return Err(Error::registration(format!(
                "closure type {rust_name} cannot be registered"
            )));
        }
        if let Some(existing) = self.record_by_rust_type(TypeId::of::<T>()) {
            return Err(Error::registration(format!(
                "{rust_name} is already registered as type id {}",
                existing.id
            )));
        }
        match id {
            Some(id) if is_reserved(id) => Err(Error::registration(format!(
                "type id {id} of {rust_name} is reserved for primitives"
            ))),
            Some(id) => match self.type_of(id) {
                Some(taken) => Err(Error::registration(format!(
                    "type id {id} of {rust_name} is already taken by {}",
                    taken.name
                ))),
                None => Ok(id),
            },
            None => (FIRST_APPLICATION_ID..=u16::MAX)
                .find(|candidate| !self.by_id.contains_key(candidate))
                .ok_or_else(|| Error::registration("type ids are exhausted")),
        }
    }

    fn insert(&mut self, record: TypeRecord) {
        let index = self.records.len();
        self.by_id.insert(record.id, index);
        self.by_type.insert(record.rust_type, index);
        self.records.push(record);
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("records", &self.records)
            .field("default_strategy", &self.default_strategy)
            .finish()
    }
}
