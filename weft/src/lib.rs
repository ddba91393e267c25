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

//! # Weft
//!
//! Binary serialization of object graphs. Shared handles are written once and
//! referenced afterwards, so aliasing and cycles survive a round trip; objects
//! are encoded field by field under stable numeric tags, so a reader tolerates
//! fields added or removed by a newer or older writer.
//!
//! ```rust,ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use weft::Weft;
//!
//! #[derive(Weft, Default)]
//! struct Node {
//!     #[weft(tag = 1)]
//!     name: String,
//!     #[weft(tag = 2)]
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//!
//! let mut weft = Weft::default();
//! weft.register::<Node>(100)?;
//!
//! let node = Rc::new(RefCell::new(Node::default()));
//! node.borrow_mut().next = Some(node.clone());
//! let bytes = weft.serialize(&node)?;
//! let copy: Rc<RefCell<Node>> = weft.deserialize(&bytes)?;
//! ```
//!
//! Generated code refers to `weft_core`, so depend on it next to this crate.

pub use weft_core::{
    bail, ensure, polymorphic, AsAny, Catalog, Config, DefaultStrategy, Deferred,
    DynObject, Enumeration, Error, Input, Locator, Object, Output, Persist, Referencable,
    Resolution, RetryQueue, Serializer, Shared, TypeKind, TypeRecord, TypeRegistry, Unresolved,
    Value, Weft,
};
pub use weft_core::{buffer, meta, strategy, types};
pub use weft_derive::Weft;
