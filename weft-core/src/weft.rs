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

use crate::buffer::Writer;
use crate::config::Config;
use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::pool::Pool;
use crate::resolver::type_registry::{TypeRecord, TypeRegistry};
use crate::serializer::deferred::Resolution;
use crate::serializer::warmup::{self, Warmup};
use crate::serializer::{Catalog, Object, Persist, Value};
use crate::strategy::{DefaultStrategy, Serializer};
use crate::types::builtin;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// The engine: a type registry plus the configuration and buffers shared by
/// every stream it creates.
///
/// Register every type first, then encode and decode. A registered `Weft` is
/// only read, so one instance can serve many threads.
///
/// # Examples
///
/// ```rust, ignore
/// use weft::Weft;
///
/// #[derive(Weft, Default, Debug, PartialEq)]
/// struct Point {
///     #[weft(tag = 1)]
///     x: i32,
///     #[weft(tag = 2)]
///     y: i32,
/// }
///
/// let mut weft = Weft::default();
/// weft.register::<Point>(200)?;
/// let bytes = weft.serialize(&Point { x: 3, y: 4 })?;
/// let point: Point = weft.deserialize(&bytes)?;
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use weft_core::Weft;
///
/// let weft = Weft::default().max_depth(64).trace(true);
/// ```
pub struct Weft {
    config: Config,
    registry: TypeRegistry,
    buffers: Pool<Vec<u8>>,
}

impl Default for Weft {
    fn default() -> Self {
        Weft::new(Config::default())
    }
}

impl Weft {
    pub fn new(config: Config) -> Self {
        let mut registry = TypeRegistry::new();
        if let Err(err) = registry.register::<Warmup>(Some(builtin::WARMUP)) {
            log::error!("failed to register the warm-up type: {err}");
        }
        let capacity = config.initial_buffer_capacity;
        Weft {
            config,
            registry,
            buffers: Pool::new(move || Vec::with_capacity(capacity)),
        }
    }

    /// Limits how deeply values may nest in one stream.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Logs every value encoded or decoded at `trace` level.
    pub fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    /// Whether a decode leaving unread bytes behind fails.
    pub fn reject_trailing_bytes(mut self, reject: bool) -> Self {
        self.config.reject_trailing_bytes = reject;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Registers `T` under `id` with the serializer of the active default
    /// strategy.
    ///
    /// # Errors
    ///
    /// A registration error when `id` is reserved or taken, or `T` is already
    /// registered.
    pub fn register<T: Object>(&mut self, id: u16) -> Result<u16, Error> {
        self.registry.register::<T>(Some(id))
    }

    /// Registers `T` under the lowest free application id.
    pub fn register_auto<T: Object>(&mut self) -> Result<u16, Error> {
        self.registry.register::<T>(None)
    }

    pub fn register_with<T: Object>(
        &mut self,
        id: Option<u16>,
        serializer: Serializer<T>,
    ) -> Result<u16, Error> {
        self.registry.register_with(id, serializer)
    }

    /// Registers the trait object `U` (e.g. `dyn Shape`) as an abstract type.
    pub fn register_abstract<U: ?Sized + 'static>(&mut self, id: u16) -> Result<u16, Error> {
        self.registry.register_abstract::<U>(Some(id))
    }

    pub fn register_subtype<U: ?Sized + 'static, C: Object>(
        &mut self,
        upcast: fn(Rc<RefCell<C>>) -> Rc<RefCell<U>>,
    ) -> Result<(), Error> {
        self.registry.register_subtype(upcast)
    }

    /// Registers the catalog `C`; its entries are encoded as `&'static C`.
    pub fn register_catalog<C: Catalog>(&mut self, id: Option<u16>) -> Result<u16, Error> {
        self.registry.register::<&'static C>(id)
    }

    /// Switches the strategy of types registered from now on, returning the
    /// previous one.
    pub fn set_default_strategy(&mut self, strategy: DefaultStrategy) -> DefaultStrategy {
        self.registry.set_default_strategy(strategy)
    }

    pub fn id_of<T: ?Sized + 'static>(&self) -> Result<u16, Error> {
        self.registry.id_of::<T>()
    }

    pub fn type_of(&self, id: u16) -> Option<&TypeRecord> {
        self.registry.type_of(id)
    }

    /// A fresh output stream, for writing several values into one buffer.
    pub fn output(&self) -> Output<'_> {
        Output::new(
            &self.registry,
            &self.config,
            Writer::with_capacity(self.config.initial_buffer_capacity),
        )
    }

    /// An input stream over `bytes`.
    pub fn input<'a>(&'a self, bytes: &'a [u8]) -> Input<'a> {
        Input::new(&self.registry, &self.config, bytes)
    }

    /// Encodes `value` into a new byte vector.
    pub fn serialize<T: Persist + ?Sized>(&self, value: &T) -> Result<Vec<u8>, Error> {
        let mut buffer = self.buffers.take();
        let mut out = Output::new(
            &self.registry,
            &self.config,
            Writer::from_vec(std::mem::take(&mut *buffer)),
        );
        let result = out.write(value);
        let encoded = out.finish();
        let bytes = result.map(|_| encoded.clone());
        *buffer = encoded;
        bytes
    }

    /// Appends the encoding of `value` to `bytes`. On error `bytes` is left as
    /// it was.
    pub fn serialize_into<T: Persist + ?Sized>(
        &self,
        value: &T,
        bytes: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let start = bytes.len();
        let writer = Writer::from_vec(std::mem::take(bytes));
        let mut out = Output::new(&self.registry, &self.config, writer);
        let result = out.write(value);
        *bytes = out.finish();
        if result.is_err() {
            bytes.truncate(start);
        }
        result
    }

    /// Decodes a `T` from `bytes`.
    ///
    /// Deferred references are left unresolved; fields that must be resolved
    /// while decoding fail with [`Error::Unresolved`].
    pub fn deserialize<T: Persist>(&self, bytes: &[u8]) -> Result<T, Error> {
        let mut input = self.input(bytes);
        let value = input.read::<T>()?;
        self.check_consumed(&input)?;
        Ok(value)
    }

    /// Decodes whatever value `bytes` hold.
    pub fn deserialize_value(&self, bytes: &[u8]) -> Result<Value, Error> {
        self.deserialize::<Value>(bytes)
    }

    /// Decodes a `T`, resolving deferred references against `state`.
    ///
    /// A reference missing from `state` yields [`Resolution::NeedsRetry`]
    /// instead of an error.
    pub fn deserialize_with<T: Persist, S: Any>(
        &self,
        bytes: &[u8],
        state: &S,
    ) -> Result<Resolution<T>, Error> {
        let mut input = self.input(bytes).with_state(state);
        match input.read::<T>() {
            Ok(value) => {
                self.check_consumed(&input)?;
                Ok(Resolution::Resolved(value))
            }
            Err(err) if err.is_unresolved() => match input.take_unresolved() {
                Some(unresolved) => Ok(Resolution::NeedsRetry(unresolved)),
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// Deep copy through an encode and decode.
    ///
    /// Each call owns its buffer for the duration of the call, so copies may
    /// run concurrently.
    pub fn copy<T: Persist>(&self, value: &T) -> Result<T, Error> {
        let mut buffer = self.buffers.take();
        let mut out = Output::new(
            &self.registry,
            &self.config,
            Writer::from_vec(std::mem::take(&mut *buffer)),
        );
        let written = out.write(value);
        *buffer = out.finish();
        written?;
        let mut input = self.input(&buffer);
        let copied = input.read::<T>()?;
        self.check_consumed(&input)?;
        Ok(copied)
    }

    /// Encodes and decodes a small self-referencing object once.
    pub fn warmup(&self) -> Result<(), Error> {
        warmup::run(|node| self.serialize(node), |bytes| self.deserialize(bytes))
    }

    fn check_consumed(&self, input: &Input<'_>) -> Result<(), Error> {
        let remaining = input.remaining();
        if self.config.reject_trailing_bytes && remaining > 0 {
            return Err(Error::invalid_data(format!(
                "{remaining} trailing bytes after the decoded value"
            )));
        }
        Ok(())
    }
}
