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

use crate::object::{bound_generics, shared_impl};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

/// Fieldless enums: variants are written as their declaration ordinal.
pub fn derive_enum(ast: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    if let Some(variant) = data
        .variants
        .iter()
        .find(|variant| !matches!(variant.fields, Fields::Unit))
    {
        return Err(syn::Error::new_spanned(
            variant,
            "#[derive(Weft)] supports fieldless enums only",
        ));
    }
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "enumerations cannot be generic",
        ));
    }
    let name = &ast.ident;
    let idents: Vec<_> = data.variants.iter().map(|variant| &variant.ident).collect();
    let ordinals: Vec<u32> = (0..idents.len() as u32).collect();
    let ordinal_body = if idents.is_empty() {
        quote! { match *self {} }
    } else {
        quote! {
            match self {
                #(Self::#idents => #ordinals,)*
            }
        }
    };

    let generics = bound_generics(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let shared = shared_impl(ast, &generics);

    Ok(quote! {
        impl #impl_generics ::weft_core::serializer::Enumeration for #name #ty_generics #where_clause {
            fn variants() -> &'static [Self] {
                &[#(Self::#idents),*]
            }

            fn ordinal(&self) -> u32 {
                #ordinal_body
            }
        }

        impl #impl_generics ::weft_core::serializer::Persist for #name #ty_generics #where_clause {
            #[inline(always)]
            fn persist_write(
                &self,
                out: &mut ::weft_core::resolver::context::Output<'_>,
            ) -> ::std::result::Result<(), ::weft_core::error::Error> {
                out.write_object(self)
            }

            #[inline(always)]
            fn persist_read_tagged(
                input: &mut ::weft_core::resolver::context::Input<'_>,
                tag: u16,
            ) -> ::std::result::Result<Self, ::weft_core::error::Error> {
                input.read_object::<Self>(tag)
            }

            fn persist_type_id(
                registry: &::weft_core::resolver::type_registry::TypeRegistry,
            ) -> ::std::result::Result<u16, ::weft_core::error::Error> {
                registry.id_of::<Self>()
            }
        }

        impl #impl_generics ::weft_core::serializer::Object for #name #ty_generics #where_clause {
            const KIND: ::weft_core::resolver::type_registry::TypeKind =
                ::weft_core::resolver::type_registry::TypeKind::Enumeration;

            fn default_serializer(
                _: ::weft_core::strategy::DefaultStrategy,
            ) -> ::std::result::Result<
                ::weft_core::strategy::Serializer<Self>,
                ::weft_core::error::Error,
            > {
                ::std::result::Result::Ok(::weft_core::serializer::enumeration_serializer::<Self>())
            }
        }

        #shared
    })
}
