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

//! # Weft Core
//!
//! The engine of the weft object-graph codec: it turns graphs of registered
//! Rust values, aliasing and cycles included, into a compact big-endian byte
//! stream and back.
//!
//! ## Architecture
//!
//! - **`weft`**: the [`Weft`] engine and its public API
//! - **`buffer`**: big-endian [`Writer`](buffer::Writer) and [`Reader`](buffer::Reader)
//! - **`types`**: primitive tags, the reference marker and built-in ids
//! - **`resolver`**: the type registry, reference tracking, streams and buffer pool
//! - **`strategy`**: the create/write/read strategy triad and the field codecs
//! - **`meta`**: per-type field descriptor tables
//! - **`serializer`**: [`Persist`] implementations for std types, shared
//!   handles, enums, catalogs, dynamic values and deferred references
//! - **`error`**: the error type and helper macros
//!
//! ## Wire format
//!
//! Every value starts with a 2-byte tag. Tags below the reference marker are
//! primitives followed by their raw payload; the marker is followed by a 4-byte
//! id of an instance written earlier in the stream; every other tag is a
//! registered type followed by what its serializer writes. A tagged object is
//! `[count:i32]` then `[tag:i32][value]` per field, ascending by tag.
//!
//! ```text
//! Point { x: 3, y: 4 } registered as 200:
//! 00 c8 | 00 00 00 02 | 00 00 00 01 00 03 00 00 00 03 | 00 00 00 02 00 03 00 00 00 04
//! ```
//!
//! This crate is normally used through the `weft` crate, which adds
//! `#[derive(Weft)]`.

pub mod buffer;
pub mod config;
pub mod error;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod strategy;
pub mod types;
pub mod util;
pub mod weft;

pub use crate::config::Config;
pub use crate::error::Error;
pub use crate::resolver::context::{Input, Output};
pub use crate::resolver::type_registry::{TypeKind, TypeRecord, TypeRegistry};
pub use crate::serializer::deferred::{
    Deferred, Locator, Referencable, Resolution, RetryQueue, Unresolved,
};
pub use crate::serializer::{
    AsAny, Catalog, DynObject, Enumeration, Object, Persist, Shared, Value,
};
pub use crate::strategy::{DefaultStrategy, Serializer};
pub use crate::weft::Weft;
