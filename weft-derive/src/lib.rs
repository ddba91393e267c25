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

//! # Weft Derive
//!
//! `#[derive(Weft)]` generates the registration glue of the weft codec:
//!
//! - **structs** get `Persist`, `Object` (a field table handed to the active
//!   default strategy) and `Shared`, so `Rc<RefCell<T>>` handles keep their
//!   identity;
//! - **fieldless enums** get `Enumeration` and are written as ordinals;
//! - **catalog structs** (`#[weft(catalog = "ENTRIES")]`) get `Catalog` and are
//!   encoded as `&'static T` by their `#[weft(key)]` field.
//!
//! ```rust,ignore
//! use weft::Weft;
//!
//! #[derive(Weft, Default)]
//! struct Order {
//!     #[weft(tag = 1)]
//!     id: i64,
//!     #[weft(tag = 2)]
//!     lines: Vec<Line>,
//!     #[weft(skip)]
//!     cached_total: Option<f64>,
//! }
//! ```
//!
//! Fields without a tag are seen only by the all-fields codec. Types without
//! `Default` name a constructor with `#[weft(create = "path")]`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;

#[proc_macro_derive(Weft, attributes(weft))]
pub fn proc_macro_derive_weft(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
