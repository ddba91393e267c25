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

//! Parsing of `#[weft(...)]` attributes.
//!
//! Field level:
//! - `tag = N`: stable numeric tag used by the tagged codec (`N >= 0`)
//! - `skip`: the field is never written; decoding leaves its default
//! - `with = "path"`: `path::write(&field, out)` and `path::read(input)` replace
//!   the generic value codec
//! - `as_reference`: the field is written as its locator
//! - `key`: the identifying key of a catalog entry
//!
//! Type level:
//! - `create = "path"`: a `fn(&mut Input<'_>) -> Result<Self, Error>` used
//!   instead of `Default`
//! - `catalog = "PATH"`: a static array of the canonical entries

use std::collections::HashMap;
use syn::{Attribute, Field, LitInt, LitStr, Path};

#[derive(Debug, Default)]
pub struct FieldMeta {
    pub tag: Option<i32>,
    pub skip: bool,
    pub with: Option<Path>,
    pub as_reference: bool,
    pub key: bool,
}

#[derive(Debug, Default)]
pub struct TypeMeta {
    pub create: Option<Path>,
    pub catalog: Option<Path>,
}

fn weft_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("weft"))
}

fn parse_path(lit: &LitStr) -> syn::Result<Path> {
    lit.parse()
        .map_err(|err| syn::Error::new(lit.span(), format!("expected a path: {err}")))
}

pub fn parse_field_meta(field: &Field) -> syn::Result<FieldMeta> {
    let mut meta = FieldMeta::default();
    for attr in weft_attrs(&field.attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("tag") {
                let lit: LitInt = nested.value()?.parse()?;
                let tag: i32 = lit.base10_parse()?;
                if tag < 0 {
                    return Err(syn::Error::new(lit.span(), "tag must be >= 0"));
                }
                meta.tag = Some(tag);
            } else if nested.path.is_ident("skip") {
                meta.skip = true;
            } else if nested.path.is_ident("with") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.with = Some(parse_path(&lit)?);
            } else if nested.path.is_ident("as_reference") {
                meta.as_reference = true;
            } else if nested.path.is_ident("key") {
                meta.key = true;
            } else {
                return Err(nested.error("unknown weft field attribute"));
            }
            Ok(())
        })?;
    }
    if meta.with.is_some() && meta.as_reference {
        return Err(syn::Error::new_spanned(
            field,
            "`with` and `as_reference` cannot be combined",
        ));
    }
    Ok(meta)
}

pub fn parse_type_meta(attrs: &[Attribute]) -> syn::Result<TypeMeta> {
    let mut meta = TypeMeta::default();
    for attr in weft_attrs(attrs) {
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("create") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.create = Some(parse_path(&lit)?);
            } else if nested.path.is_ident("catalog") {
                let lit: LitStr = nested.value()?.parse()?;
                meta.catalog = Some(parse_path(&lit)?);
            } else {
                return Err(nested.error("unknown weft type attribute"));
            }
            Ok(())
        })?;
    }
    Ok(meta)
}

/// Rejects two written fields sharing a tag.
pub fn validate_field_metas(fields: &[(&Field, FieldMeta)]) -> syn::Result<()> {
    let mut by_tag: HashMap<i32, String> = HashMap::new();
    for (field, meta) in fields {
        if meta.skip {
            continue;
        }
        if let Some(tag) = meta.tag {
            let name = field
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .unwrap_or_default();
            if let Some(existing) = by_tag.get(&tag) {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("duplicate weft tag {tag} on fields `{existing}` and `{name}`"),
                ));
            }
            by_tag.insert(tag, name);
        }
    }
    Ok(())
}
