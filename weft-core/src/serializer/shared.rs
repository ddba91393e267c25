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

//! Shared handles.
//!
//! An instance reachable through several handles is written once; later
//! occurrences in the same stream are reference markers. Decoding rebuilds
//! the aliasing, cycles included: `Rc::ptr_eq` holds between the decoded
//! handles exactly where it held between the encoded ones.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::ref_tracker::Slot;
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::{is_primitive, NULL, REFERENCE_MARKER};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Access to the concrete type behind a trait object.
///
/// Traits used as polymorphic field types take it as a supertrait:
/// `trait Shape: AsAny { .. }`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline(always)]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Content of an `Rc<RefCell<Self>>` handle.
///
/// Implemented by `#[derive(Weft)]` for concrete types and by
/// [`polymorphic!`](crate::polymorphic) for trait objects.
pub trait Shared: 'static {
    fn write_shared(&self, out: &mut Output<'_>) -> Result<(), Error>;

    /// Reads the content of a handle whose tag was already consumed; a
    /// reference marker yields the earlier handle.
    fn read_shared(input: &mut Input<'_>, tag: u16) -> Result<Rc<RefCell<Self>>, Error>;

    fn shared_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        registry.id_of::<Self>()
    }
}

/// Makes `Rc<RefCell<dyn Trait>>` encodable.
///
/// The trait must have [`AsAny`] as a supertrait and be registered with
/// `register_abstract`; each implementor is then declared with
/// `register_subtype`.
///
/// ```rust,ignore
/// trait Shape: AsAny {
///     fn area(&self) -> f64;
/// }
/// weft::polymorphic!(Shape);
///
/// weft.register_abstract::<dyn Shape>(300)?;
/// weft.register::<Circle>(301)?;
/// weft.register_subtype::<dyn Shape, Circle>(|c| c)?;
/// ```
#[macro_export]
macro_rules! polymorphic {
    ($($trait_:ident),+ $(,)?) => {
        $(
            impl $crate::serializer::Shared for dyn $trait_ {
                fn write_shared(
                    &self,
                    out: &mut $crate::resolver::context::Output<'_>,
                ) -> ::std::result::Result<(), $crate::error::Error> {
                    out.write_polymorphic($crate::serializer::AsAny::as_any(self))
                }

                fn read_shared(
                    input: &mut $crate::resolver::context::Input<'_>,
                    tag: u16,
                ) -> ::std::result::Result<
                    ::std::rc::Rc<::std::cell::RefCell<Self>>,
                    $crate::error::Error,
                > {
                    input.read_polymorphic::<Self>(tag)
                }
            }
        )+
    };
}

#[inline(always)]
fn address<T: ?Sized>(ptr: *const T) -> usize {
    ptr as *const () as usize
}

impl<T: ?Sized + Shared> Persist for Rc<RefCell<T>> {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.write_shared_handle(address(Rc::as_ptr(self)), |out| {
            let value = self.try_borrow().map_err(|_| {
                Error::write_error(format!(
                    "{} is mutably borrowed while being written",
                    std::any::type_name::<T>()
                ))
            })?;
            value.write_shared(out)
        })
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        if tag == NULL {
            return Err(Error::unexpected_null(format!(
                "expected a {} handle",
                std::any::type_name::<T>()
            )));
        }
        T::read_shared(input, tag)
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        T::shared_type_id(registry)
    }
}

/// An immutable shared handle. Aliasing is preserved, but an `Rc<T>` cannot
/// take part in a cycle.
///
/// An `Rc` around another shared handle shares that handle's reference id, so
/// it is identified by what it wraps: aliases of the outer handle stay
/// aliases, and two outer handles around the same inner one decode as one.
impl<T: Persist + 'static> Persist for Rc<T> {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.write_shared_handle(address(Rc::as_ptr(self)), |out| (**self).persist_write(out))
    }

    #[inline(always)]
    fn encodes_as_null(&self) -> bool {
        (**self).encodes_as_null()
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        let rust_type = TypeId::of::<T>();
        if tag == REFERENCE_MARKER {
            let id = input.peek_ref_id()?;
            let (handle, _, wire_id) = input.refs.shared(id)?;
            let known = match handle.clone().downcast::<T>() {
                Ok(shared) => Some(shared),
                Err(_) => input
                    .refs
                    .wrapper(id, rust_type)
                    .and_then(|wrapper| wrapper.clone().downcast::<T>().ok()),
            };
            if let Some(shared) = known {
                input.read_ref_id()?;
                return Ok(shared);
            }
            // the first outer handle seen around an instance written earlier
            let inner = T::persist_read_tagged(input, tag).map_err(|_| {
                Error::type_mismatch(format!(
                    "reference #{id} (type id {wire_id}) is not a {}",
                    std::any::type_name::<T>()
                ))
            })?;
            let shared = Rc::new(inner);
            input.refs.bind_wrapper(id, rust_type, shared.clone());
            return Ok(shared);
        }
        let slot = input.refs.next_id();
        let shared = Rc::new(T::persist_read_tagged(input, tag)?);
        if !is_primitive(tag) {
            let handle: Rc<dyn Any> = shared.clone();
            let (plain, wrapped) = match input.refs.get(slot) {
                Some(Slot::Value) => (true, false),
                Some(Slot::Shared { .. }) => (false, true),
                _ => (false, false),
            };
            if plain {
                input.refs.bind(slot, handle, rust_type, tag)?;
            } else if wrapped {
                input.refs.bind_wrapper(slot, rust_type, handle);
            }
        }
        Ok(shared)
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        T::persist_type_id(registry)
    }
}

/// A dead handle is written as NULL and decodes to an empty `Weak`.
impl<T: Shared> Persist for Weak<RefCell<T>> {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        match self.upgrade() {
            Some(shared) => shared.persist_write(out),
            None => {
                out.write_null();
                Ok(())
            }
        }
    }

    fn encodes_as_null(&self) -> bool {
        self.strong_count() == 0
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        if tag == NULL {
            return Ok(Weak::new());
        }
        let shared = T::read_shared(input, tag)?;
        Ok(Rc::downgrade(&shared))
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        T::shared_type_id(registry)
    }
}
