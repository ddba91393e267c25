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

mod catalog;
mod enum_;
mod field_meta;
mod struct_;

use field_meta::parse_type_meta;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DeriveInput, GenericParam, Generics};

pub fn derive_object(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let meta = parse_type_meta(&ast.attrs)?;
    match &ast.data {
        Data::Struct(data) => match &meta.catalog {
            Some(entries) => catalog::derive_catalog(ast, &data.fields, &meta, entries),
            None => struct_::derive_struct(ast, &data.fields, &meta),
        },
        Data::Enum(data) => {
            if meta.create.is_some() || meta.catalog.is_some() {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "`create` and `catalog` do not apply to enums",
                ));
            }
            enum_::derive_enum(ast, data)
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "#[derive(Weft)] does not support unions",
        )),
    }
}

/// Adds `Persist + 'static` to every type parameter.
pub(crate) fn bound_generics(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(ty) => Some(ty.ident.clone()),
            _ => None,
        })
        .collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause
            .predicates
            .push(parse_quote!(#ident: ::weft_core::serializer::Persist + 'static));
    }
    generics
}

/// Lets `Rc<RefCell<Self>>` handles carry identity and cycles.
pub(crate) fn shared_impl(ast: &DeriveInput, generics: &Generics) -> TokenStream {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::weft_core::serializer::Shared for #name #ty_generics #where_clause {
            #[inline(always)]
            fn write_shared(
                &self,
                out: &mut ::weft_core::resolver::context::Output<'_>,
            ) -> ::std::result::Result<(), ::weft_core::error::Error> {
                out.write_object(self)
            }

            #[inline(always)]
            fn read_shared(
                input: &mut ::weft_core::resolver::context::Input<'_>,
                tag: u16,
            ) -> ::std::result::Result<
                ::std::rc::Rc<::std::cell::RefCell<Self>>,
                ::weft_core::error::Error,
            > {
                input.read_object_shared::<Self>(tag)
            }
        }
    }
}
