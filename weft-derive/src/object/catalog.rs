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

use crate::object::field_meta::{parse_field_meta, TypeMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Fields, Path};

/// `#[weft(catalog = "ENTRIES")]` structs: entries are encoded by the field
/// marked `#[weft(key)]`.
pub fn derive_catalog(
    ast: &DeriveInput,
    fields: &Fields,
    meta: &TypeMeta,
    entries: &Path,
) -> syn::Result<TokenStream> {
    if meta.create.is_some() {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "catalog entries are never created; drop `create`",
        ));
    }
    let mut key = None;
    for field in fields {
        if parse_field_meta(field)?.key {
            if key.is_some() {
                return Err(syn::Error::new_spanned(field, "a catalog has one `key` field"));
            }
            key = Some(field);
        }
    }
    let Some(key) = key else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "a catalog needs a field marked #[weft(key)]",
        ));
    };
    let Some(key_ident) = key.ident.as_ref() else {
        return Err(syn::Error::new_spanned(key, "the catalog key must be a named field"));
    };
    let key_ty = &key.ty;
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::weft_core::serializer::Catalog for #name #ty_generics #where_clause {
            type Key = #key_ty;

            fn entries() -> &'static [Self] {
                &#entries[..]
            }

            fn key(&self) -> Self::Key {
                ::std::clone::Clone::clone(&self.#key_ident)
            }
        }
    })
}
