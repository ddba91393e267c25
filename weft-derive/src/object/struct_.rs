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

use crate::object::field_meta::{parse_field_meta, validate_field_metas, FieldMeta, TypeMeta};
use crate::object::{bound_generics, shared_impl};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Field, Fields};

pub fn derive_struct(ast: &DeriveInput, fields: &Fields, meta: &TypeMeta) -> syn::Result<TokenStream> {
    let named: Vec<&Field> = match fields {
        Fields::Named(named) => named.named.iter().collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "#[derive(Weft)] needs named fields",
            ))
        }
    };
    let metas = named
        .iter()
        .map(|field| parse_field_meta(field).map(|meta| (*field, meta)))
        .collect::<syn::Result<Vec<_>>>()?;
    validate_field_metas(&metas)?;
    if let Some((field, _)) = metas.iter().find(|(_, meta)| meta.key) {
        return Err(syn::Error::new_spanned(
            field,
            "`key` only applies to catalog types",
        ));
    }

    let name = &ast.ident;
    let type_name = name.unraw().to_string();
    let entries: Vec<TokenStream> = metas
        .iter()
        .filter(|(_, meta)| !meta.skip)
        .map(|(field, meta)| field_entry(field, meta))
        .collect();
    let create = match &meta.create {
        Some(path) => quote! { #path },
        None => quote! { ::weft_core::strategy::DefaultCreate },
    };

    let generics = bound_generics(&ast.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let shared = shared_impl(ast, &generics);

    Ok(quote! {
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
            fn default_serializer(
                strategy: ::weft_core::strategy::DefaultStrategy,
            ) -> ::std::result::Result<
                ::weft_core::strategy::Serializer<Self>,
                ::weft_core::error::Error,
            > {
                let fields = ::weft_core::meta::FieldTable::<Self>::new(
                    #type_name,
                    ::std::vec![#(#entries),*],
                )?;
                ::std::result::Result::Ok(::weft_core::strategy::Serializer::for_strategy(
                    strategy,
                    #create,
                    fields,
                ))
            }
        }

        #shared
    })
}

fn field_entry(field: &Field, meta: &FieldMeta) -> TokenStream {
    let Some(ident) = field.ident.as_ref() else {
        return quote! {};
    };
    let field_name = ident.unraw().to_string();
    let (write, read) = if let Some(path) = &meta.with {
        (
            quote! { #path::write(&value.#ident, out) },
            quote! { #path::read(input) },
        )
    } else if meta.as_reference {
        (
            quote! { ::weft_core::serializer::deferred::write_as_reference(&value.#ident, out) },
            quote! { ::weft_core::serializer::deferred::read_as_reference(input) },
        )
    } else {
        (quote! { out.write(&value.#ident) }, quote! { input.read() })
    };
    let write = quote! { |value, out| #write };
    let read = quote! {
        |value, input| {
            value.#ident = #read?;
            ::std::result::Result::Ok(())
        }
    };
    match meta.tag {
        Some(tag) => quote! {
            ::weft_core::meta::Field::<Self>::tagged(#tag, #field_name, #write, #read)
        },
        None => quote! {
            ::weft_core::meta::Field::<Self>::untagged(#field_name, #write, #read)
        },
    }
}
