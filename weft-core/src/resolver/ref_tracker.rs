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

//! Per-stream reference tracking.
//!
//! Every non-primitive value written to a stream consumes one reference id, in
//! write order, whether or not it can ever be aliased. The reader reserves ids
//! in exactly the same order, so both sides agree on the numbering without the
//! id itself being written. Only instances reachable through a shared handle
//! are remembered by identity; a second occurrence of such an instance is
//! written as `[REFERENCE_MARKER][id]`.

use crate::error::Error;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Write-side identity map, keyed by handle address.
#[derive(Default, Debug)]
pub struct RefWriter {
    refs: HashMap<usize, u32>,
    next_id: u32,
}

impl RefWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference id already assigned to the instance at `addr`, if any.
    #[inline(always)]
    pub fn lookup(&self, addr: usize) -> Option<u32> {
        self.refs.get(&addr).copied()
    }

    /// Consumes the next reference id and remembers `identity` under it.
    pub fn assign(&mut self, identity: Option<usize>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(addr) = identity {
            self.refs.insert(addr, id);
        }
        id
    }

    /// Remembers another handle whose content was written under `id`.
    pub fn alias(&mut self, addr: usize, id: u32) {
        self.refs.insert(addr, id);
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn reset(&mut self) {
        self.refs.clear();
        self.next_id = 0;
    }
}

/// State of one reference id during a decode.
pub enum Slot {
    /// Reserved; the instance is still being created.
    Pending,
    /// Decoded as a plain value; it cannot be the target of a reference.
    Value,
    /// Decoded behind a shared handle.
    Shared {
        /// An `Rc<RefCell<C>>` (or `Rc<C>`) erased to `Rc<dyn Any>`.
        handle: Rc<dyn Any>,
        rust_type: TypeId,
        wire_id: u16,
    },
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Pending => f.write_str("Pending"),
            Slot::Value => f.write_str("Value"),
            Slot::Shared { wire_id, .. } => write!(f, "Shared({wire_id})"),
        }
    }
}

/// Read-side identity map, indexed by reference id.
#[derive(Default, Debug)]
pub struct RefReader {
    slots: Vec<Slot>,
    // handles wrapping the shared instance of a slot, by their own type
    wrappers: HashMap<(u32, TypeId), Rc<dyn Any>>,
}

impl RefReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next reference id before its instance is created.
    #[inline(always)]
    pub fn reserve(&mut self) -> u32 {
        self.slots.push(Slot::Pending);
        (self.slots.len() - 1) as u32
    }

    /// Id the next reservation will return.
    pub fn next_id(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Makes `id` point to a shared handle.
    ///
    /// Fails when another handle already claims the id.
    pub fn bind(
        &mut self,
        id: u32,
        handle: Rc<dyn Any>,
        rust_type: TypeId,
        wire_id: u16,
    ) -> Result<(), Error> {
        match self.slots.get_mut(id as usize) {
            Some(Slot::Shared { .. }) => Err(Error::invalid_ref(format!(
                "more than one instance claims reference id {id}"
            ))),
            Some(slot) => {
                *slot = Slot::Shared {
                    handle,
                    rust_type,
                    wire_id,
                };
                Ok(())
            }
            None => Err(Error::invalid_ref(format!(
                "reference id {id} was never reserved"
            ))),
        }
    }

    /// Marks a plain value as complete. Shared slots are left as they are.
    pub fn settle(&mut self, id: u32) {
        if let Some(slot @ Slot::Pending) = self.slots.get_mut(id as usize) {
            *slot = Slot::Value;
        }
    }

    pub fn get(&self, id: u32) -> Option<&Slot> {
        self.slots.get(id as usize)
    }

    /// Looks up the handle a reference marker points to.
    pub fn shared(&self, id: u32) -> Result<(&Rc<dyn Any>, TypeId, u16), Error> {
        match self.slots.get(id as usize) {
            Some(Slot::Shared {
                handle,
                rust_type,
                wire_id,
            }) => Ok((handle, *rust_type, *wire_id)),
            Some(Slot::Pending) => Err(Error::invalid_ref(format!(
                "reference id {id} points to an instance still under construction"
            ))),
            Some(Slot::Value) => Err(Error::invalid_ref(format!(
                "reference id {id} points to an instance that is not shared"
            ))),
            None => Err(Error::invalid_ref(format!(
                "reference id {id} is out of range ({} known)",
                self.slots.len()
            ))),
        }
    }

    /// A handle of type `rust_type` that wraps the instance at `id`.
    pub fn wrapper(&self, id: u32, rust_type: TypeId) -> Option<&Rc<dyn Any>> {
        self.wrappers.get(&(id, rust_type))
    }

    pub fn bind_wrapper(&mut self, id: u32, rust_type: TypeId, handle: Rc<dyn Any>) {
        self.wrappers.entry((id, rust_type)).or_insert(handle);
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.wrappers.clear();
    }
}
