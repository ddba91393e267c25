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

//! Deferred references to objects owned by live state.
//!
//! Some objects are never reconstructed from a stream: the stream carries a
//! lightweight [`Locator`] and decoding looks the live object up in state the
//! caller supplies. When the lookup finds nothing the decode ends with
//! [`Resolution::NeedsRetry`] rather than a read error, telling the caller to
//! try again once the state has caught up.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::weft::Weft;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// Identifies a live object inside a `State`.
///
/// The locator itself is written like any other value, usually as a tagged
/// object.
pub trait Locator: Persist + fmt::Debug + 'static {
    type Target;
    type State: 'static;

    fn resolve(&self, state: &Self::State) -> Option<Self::Target>;
}

/// A type written as a locator instead of by value.
pub trait Referencable {
    type Locator: Locator<Target = Self>;

    fn to_locator(&self) -> Self::Locator;
}

/// Outcome of resolving deferred references.
#[derive(Debug)]
pub enum Resolution<T, L = Unresolved> {
    Resolved(T),
    /// The state does not hold the target yet.
    NeedsRetry(L),
}

impl<T, L> Resolution<T, L> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::NeedsRetry(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U, L> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::NeedsRetry(locator) => Resolution::NeedsRetry(locator),
        }
    }
}

/// The locator that could not be resolved, type-erased.
pub struct Unresolved {
    locator: Box<dyn Any>,
    description: String,
}

impl Unresolved {
    pub fn new<L: Locator>(locator: L) -> Self {
        Unresolved {
            description: format!("{locator:?}"),
            locator: Box::new(locator),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn locator<L: Locator>(&self) -> Option<&L> {
        self.locator.downcast_ref::<L>()
    }
}

impl fmt::Debug for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unresolved").field(&self.description).finish()
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved {}", self.description)
    }
}

/// Fails the current read with [`Error::Unresolved`], remembering `locator`.
fn unresolved<L: Locator>(input: &mut Input<'_>, locator: L, why: &str) -> Error {
    let err = Error::unresolved(format!("{locator:?} {why}"));
    input.unresolved = Some(Unresolved::new(locator));
    err
}

/// A locator together with its target once resolved.
pub struct Deferred<L: Locator> {
    locator: L,
    target: Option<L::Target>,
}

impl<L: Locator> Deferred<L> {
    pub fn new(locator: L) -> Self {
        Deferred {
            locator,
            target: None,
        }
    }

    /// A reference to an existing target.
    pub fn to(target: L::Target) -> Self
    where
        L::Target: Referencable<Locator = L>,
    {
        Deferred {
            locator: target.to_locator(),
            target: Some(target),
        }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn get(&self) -> Option<&L::Target> {
        self.target.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub fn into_target(self) -> Option<L::Target> {
        self.target
    }

    /// Resolves against `state` unless already resolved.
    pub fn resolve(&mut self, state: &L::State) -> Resolution<&L::Target, &L> {
        if self.target.is_none() {
            self.target = self.locator.resolve(state);
        }
        match self.target {
            Some(ref target) => Resolution::Resolved(target),
            None => Resolution::NeedsRetry(&self.locator),
        }
    }
}

impl<L: Locator + Default> Default for Deferred<L> {
    fn default() -> Self {
        Deferred::new(L::default())
    }
}

impl<L: Locator> fmt::Debug for Deferred<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("locator", &self.locator)
            .field("resolved", &self.target.is_some())
            .finish()
    }
}

/// Written as its locator. Read with a matching state attached, the target is
/// resolved on the spot; without one it is left for the caller.
impl<L: Locator> Persist for Deferred<L> {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        self.locator.persist_write(out)
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        let locator = L::persist_read_tagged(input, tag)?;
        let Some(state) = input.state::<L::State>() else {
            return Ok(Deferred::new(locator));
        };
        match locator.resolve(state) {
            Some(target) => Ok(Deferred {
                locator,
                target: Some(target),
            }),
            None => Err(unresolved(input, locator, "is not present in the state")),
        }
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        L::persist_type_id(registry)
    }
}

/// Field writer behind `#[weft(as_reference)]`.
pub fn write_as_reference<T: Referencable>(value: &T, out: &mut Output<'_>) -> Result<(), Error> {
    out.write(&value.to_locator())
}

/// Field reader behind `#[weft(as_reference)]`; the target must be present in
/// the attached state.
pub fn read_as_reference<T: Referencable>(input: &mut Input<'_>) -> Result<T, Error> {
    let locator = input.read::<T::Locator>()?;
    let Some(state) = input.state::<<T::Locator as Locator>::State>() else {
        return Err(unresolved(input, locator, "cannot be resolved without state"));
    };
    match locator.resolve(state) {
        Some(target) => Ok(target),
        None => Err(unresolved(input, locator, "is not present in the state")),
    }
}

struct Parked {
    bytes: Vec<u8>,
    reason: Unresolved,
}

/// Encoded values whose decode needs a retry.
pub struct RetryQueue<T> {
    parked: Vec<Parked>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for RetryQueue<T> {
    fn default() -> Self {
        RetryQueue {
            parked: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: Persist> RetryQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` against `state`, parking them when a deferred reference
    /// cannot be resolved yet.
    pub fn decode_or_park<S: Any>(
        &mut self,
        weft: &Weft,
        bytes: Vec<u8>,
        state: &S,
    ) -> Result<Option<T>, Error> {
        match weft.deserialize_with::<T, S>(&bytes, state)? {
            Resolution::Resolved(value) => Ok(Some(value)),
            Resolution::NeedsRetry(reason) => {
                log::debug!("parking {} bytes: {reason}", bytes.len());
                self.parked.push(Parked { bytes, reason });
                Ok(None)
            }
        }
    }

    /// Re-attempts every parked payload; those still unresolved stay parked.
    ///
    /// A payload that now fails with any other error is dropped.
    pub fn retry<S: Any>(&mut self, weft: &Weft, state: &S) -> Vec<T> {
        let mut decoded = Vec::new();
        for parked in std::mem::take(&mut self.parked) {
            match weft.deserialize_with::<T, S>(&parked.bytes, state) {
                Ok(Resolution::Resolved(value)) => decoded.push(value),
                Ok(Resolution::NeedsRetry(reason)) => self.parked.push(Parked {
                    bytes: parked.bytes,
                    reason,
                }),
                Err(err) => log::warn!("dropping parked payload ({}): {err}", parked.reason),
            }
        }
        decoded
    }

    pub fn len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parked.is_empty()
    }

    /// Why each parked payload failed, oldest first.
    pub fn reasons(&self) -> impl Iterator<Item = &Unresolved> {
        self.parked.iter().map(|parked| &parked.reason)
    }
}
