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

//! Output and input streams.
//!
//! A stream owns the per-stream identity map, so it must not be shared between
//! concurrent encodes or decodes. Streams reused for several independent
//! values must call `clear_references` in between, otherwise a later value may
//! be written as a reference into an earlier one.

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_tracker::{RefReader, RefWriter};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::deferred::Unresolved;
use crate::serializer::{Object, Persist, Value};
use crate::types::{Primitive, NULL, REFERENCE_MARKER};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

/// Human readable name of a wire tag, for error messages.
pub(crate) fn describe_tag(registry: &TypeRegistry, tag: u16) -> String {
    if let Some(primitive) = Primitive::from_id(tag) {
        return primitive.name().to_string();
    }
    if tag == REFERENCE_MARKER {
        return "a reference marker".to_string();
    }
    match registry.type_of(tag) {
        Some(record) => format!("{} (id {tag})", record.name()),
        None => format!("unregistered id {tag}"),
    }
}

pub struct Output<'a> {
    pub writer: Writer,
    registry: &'a TypeRegistry,
    config: &'a Config,
    refs: RefWriter,
    // addresses of the nested shared handles whose content is about to be
    // written; the next object begun takes all of them
    pending_identity: Vec<usize>,
    depth: u32,
}

impl<'a> Output<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a Config, writer: Writer) -> Output<'a> {
        Output {
            writer,
            registry,
            config,
            refs: RefWriter::new(),
            pending_identity: Vec::new(),
            depth: 0,
        }
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Writes any encodable value as `[tag][payload]`.
    #[inline(always)]
    pub fn write<T: Persist + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.persist_write(self)
    }

    #[inline(always)]
    pub fn write_null(&mut self) {
        self.writer.write_u16(NULL);
    }

    /// Writes a registered object through its serializer.
    pub fn write_object<T: Object>(&mut self, value: &T) -> Result<(), Error> {
        let registry = self.registry;
        let (serializer, id) = registry.serializer_of::<T>()?;
        self.writer.write_u16(id);
        self.begin(T::type_name())?;
        serializer.write(value, self)?;
        self.end();
        Ok(())
    }

    /// Writes a built-in container: the marker id, then what `body` writes.
    pub fn write_builtin<F>(&mut self, id: u16, body: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.writer.write_u16(id);
        let name = self.registry.type_of(id).map_or("builtin", |r| r.name());
        self.begin(name)?;
        body(self)?;
        self.end();
        Ok(())
    }

    /// Writes the content of the shared handle at `addr`, or a reference
    /// marker when the handle was written earlier in this stream.
    pub fn write_shared_handle<F>(&mut self, addr: usize, body: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        if let Some(id) = self.refs.lookup(addr) {
            for outer in self.pending_identity.drain(..) {
                self.refs.alias(outer, id);
            }
            self.writer.write_u16(REFERENCE_MARKER);
            self.writer.write_i32(id as i32);
            if self.config.trace {
                log::trace!("{:width$}-> #{id}", "", width = self.indent());
            }
            return Ok(());
        }
        let mark = self.pending_identity.len();
        self.pending_identity.push(addr);
        let result = body(self);
        self.pending_identity.truncate(mark);
        result
    }

    /// Writes an object known only as `&dyn Any`, looking its type up by
    /// runtime type id.
    pub fn write_polymorphic(&mut self, value: &dyn Any) -> Result<(), Error> {
        let rust_type = (*value).type_id();
        let record = self
            .registry
            .record_by_rust_type(rust_type)
            .ok_or_else(|| Error::unregistered_type(format!("{rust_type:?}")))?;
        let harness = record.harness().ok_or_else(|| {
            Error::write_error(format!("{} cannot be written by itself", record.name()))
        })?;
        harness.write_value(value, self)
    }

    /// Forgets every instance written so far and restarts reference numbering.
    pub fn clear_references(&mut self) {
        self.refs.reset();
        self.pending_identity.clear();
        self.depth = 0;
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn begin(&mut self, name: &str) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::depth_exceed(format!(
                "writing {name} at depth {} (limit {})",
                self.depth, self.config.max_depth
            )));
        }
        let ref_id = self.refs.assign(None);
        for addr in self.pending_identity.drain(..) {
            self.refs.alias(addr, ref_id);
        }
        if self.config.trace {
            log::trace!("{:width$}{name} #{ref_id}", "", width = self.indent());
        }
        Ok(())
    }

    #[inline(always)]
    fn end(&mut self) {
        self.depth -= 1;
    }

    fn indent(&self) -> usize {
        self.depth as usize * 2
    }
}

pub struct Input<'a> {
    pub reader: Reader<'a>,
    registry: &'a TypeRegistry,
    config: &'a Config,
    pub(crate) refs: RefReader,
    state: Option<&'a dyn Any>,
    pub(crate) unresolved: Option<Unresolved>,
    depth: u32,
}

impl<'a> Input<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a Config, bytes: &'a [u8]) -> Input<'a> {
        Input {
            reader: Reader::new(bytes),
            registry,
            config,
            refs: RefReader::new(),
            state: None,
            unresolved: None,
            depth: 0,
        }
    }

    /// Attaches the live state deferred references are resolved against.
    pub fn with_state<S: Any>(mut self, state: &'a S) -> Input<'a> {
        self.state = Some(state);
        self
    }

    #[inline(always)]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    #[inline(always)]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The attached state, when it is an `S`.
    pub fn state<S: Any>(&self) -> Option<&'a S> {
        self.state?.downcast_ref::<S>()
    }

    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// The deferred reference that made the last read fail, if any.
    pub fn take_unresolved(&mut self) -> Option<Unresolved> {
        self.unresolved.take()
    }

    #[inline(always)]
    pub fn read<T: Persist>(&mut self) -> Result<T, Error> {
        T::persist_read(self)
    }

    #[inline(always)]
    pub fn read_tag(&mut self) -> Result<u16, Error> {
        self.reader.read_u16()
    }

    /// Decodes the next value without a static type.
    pub fn read_value(&mut self) -> Result<Value, Error> {
        Value::persist_read(self)
    }

    /// Reads the 4-byte id following a reference marker.
    pub fn read_ref_id(&mut self) -> Result<u32, Error> {
        let id = self.reader.read_i32()?;
        if id < 0 {
            return Err(Error::invalid_ref(format!("negative reference id {id}")));
        }
        Ok(id as u32)
    }

    /// The id after a reference marker, without consuming it.
    pub fn peek_ref_id(&self) -> Result<u32, Error> {
        Reader::new(self.reader.slice_after_cursor()).read_i32().and_then(|id| {
            u32::try_from(id).map_err(|_| Error::invalid_ref(format!("negative reference id {id}")))
        })
    }

    /// Decodes a registered object whose tag was already read.
    pub fn read_object<T: Object>(&mut self, tag: u16) -> Result<T, Error> {
        let registry = self.registry;
        let (serializer, id) = registry.serializer_of::<T>()?;
        if tag != id {
            return Err(self.unexpected_tag(tag, id).with_type::<T>());
        }
        let slot = self.refs.reserve();
        self.begin(T::type_name(), slot)?;
        let mut value = serializer.create(self)?;
        serializer.read(&mut value, self)?;
        self.end();
        self.refs.settle(slot);
        Ok(value)
    }

    /// Decodes a registered object into a shared handle, or returns the handle
    /// a reference marker points to.
    ///
    /// The handle is bound to its reference id before its fields are read, so
    /// fields that point back to it resolve to the same handle.
    pub fn read_object_shared<T: Object>(&mut self, tag: u16) -> Result<Rc<RefCell<T>>, Error> {
        if tag == REFERENCE_MARKER {
            let id = self.read_ref_id()?;
            let (handle, _, wire_id) = self.refs.shared(id)?;
            return handle.clone().downcast::<RefCell<T>>().map_err(|_| {
                Error::type_mismatch(format!(
                    "reference #{id} is {}, expected {}",
                    describe_tag(self.registry, wire_id),
                    T::type_name()
                ))
            });
        }
        let registry = self.registry;
        let (serializer, id) = registry.serializer_of::<T>()?;
        if tag != id {
            return Err(self.unexpected_tag(tag, id).with_type::<T>());
        }
        let slot = self.refs.reserve();
        self.begin(T::type_name(), slot)?;
        let value = serializer.create(self)?;
        let shared = Rc::new(RefCell::new(value));
        let handle: Rc<dyn Any> = shared.clone();
        self.refs.bind(slot, handle, TypeId::of::<T>(), id)?;
        serializer.read(&mut shared.borrow_mut(), self)?;
        self.end();
        Ok(shared)
    }

    /// Decodes a subtype of the abstract `U` into a shared handle of `U`.
    ///
    /// The concrete type on the wire must have been declared a subtype of `U`.
    pub fn read_polymorphic<U: ?Sized + 'static>(
        &mut self,
        tag: u16,
    ) -> Result<Rc<RefCell<U>>, Error> {
        let registry = self.registry;
        let target_record = registry.record_of::<U>()?;
        let (target, target_id) = (target_record.name(), target_record.id());
        let (handle, rust_type, wire_id) = if tag == REFERENCE_MARKER {
            let id = self.read_ref_id()?;
            let (handle, rust_type, wire_id) = self.refs.shared(id)?;
            (handle.clone(), rust_type, wire_id)
        } else {
            let record = registry
                .type_of(tag)
                .ok_or_else(|| self.unexpected_tag(tag, target_id))?;
            if !registry.is_subtype::<U>(record.rust_type()) {
                return Err(Error::type_mismatch(format!(
                    "{} is not a registered subtype of {target}",
                    record.name()
                )));
            }
            let harness = record.harness().ok_or_else(|| {
                Error::type_mismatch(format!("{} cannot be instantiated", record.name()))
            })?;
            (harness.read_shared(self, tag)?, record.rust_type(), tag)
        };
        registry.upcast::<U>(handle, rust_type).ok_or_else(|| {
            Error::type_mismatch(format!(
                "{} is not a registered subtype of {target}",
                describe_tag(registry, wire_id)
            ))
        })
    }

    /// Decodes any registered object into a type-erased shared handle.
    pub fn read_shared_any(&mut self, tag: u16) -> Result<(Rc<dyn Any>, u16), Error> {
        if tag == REFERENCE_MARKER {
            let id = self.read_ref_id()?;
            let (handle, _, wire_id) = self.refs.shared(id)?;
            return Ok((handle.clone(), wire_id));
        }
        let record = self
            .registry
            .type_of(tag)
            .ok_or_else(|| Error::unknown_type_id(tag))?;
        let harness = record.harness().ok_or_else(|| {
            Error::type_mismatch(format!("{} cannot be instantiated", record.name()))
        })?;
        Ok((harness.read_shared(self, tag)?, tag))
    }

    /// Decodes a built-in container whose tag was already read.
    pub fn read_builtin<R, F>(&mut self, tag: u16, expected: u16, body: F) -> Result<R, Error>
    where
        F: FnOnce(&mut Self) -> Result<R, Error>,
    {
        if tag != expected {
            return Err(self.unexpected_tag(tag, expected));
        }
        let slot = self.refs.reserve();
        let name = self.registry.type_of(expected).map_or("builtin", |r| r.name());
        self.begin(name, slot)?;
        let value = body(self)?;
        self.end();
        self.refs.settle(slot);
        Ok(value)
    }

    /// Checks that `tag` is the given primitive.
    #[inline(always)]
    pub fn expect_primitive(&self, tag: u16, expected: Primitive) -> Result<(), Error> {
        if tag == expected.id() {
            Ok(())
        } else {
            Err(self.unexpected_tag(tag, expected.id()))
        }
    }

    /// Forgets every instance read so far and restarts reference numbering.
    pub fn clear_references(&mut self) {
        self.refs.reset();
        self.unresolved = None;
        self.depth = 0;
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub(crate) fn unexpected_tag(&self, tag: u16, expected: u16) -> Error {
        let expected = describe_tag(self.registry, expected);
        match tag {
            NULL => Error::unexpected_null(format!("expected {expected}")),
            REFERENCE_MARKER => Error::invalid_ref(format!(
                "expected {expected}, found a reference to a value that is not shared"
            )),
            _ if Primitive::from_id(tag).is_none() && self.registry.type_of(tag).is_none() => {
                Error::unknown_type_id(tag)
            }
            _ => Error::type_mismatch(format!(
                "expected {expected}, found {}",
                describe_tag(self.registry, tag)
            )),
        }
    }

    fn begin(&mut self, name: &str, slot: u32) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::depth_exceed(format!(
                "reading {name} at depth {} (limit {})",
                self.depth, self.config.max_depth
            )));
        }
        if self.config.trace {
            log::trace!("{:width$}{name} #{slot}", "", width = self.depth as usize * 2);
        }
        Ok(())
    }

    #[inline(always)]
    fn end(&mut self) {
        self.depth -= 1;
    }
}
