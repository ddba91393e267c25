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

//! Per-type field descriptor tables.
//!
//! A table is built once, when its type is registered, from accessor functions
//! that `#[derive(Weft)]` generates. Encoding and decoding only ever read it, so
//! one table is shared by every stream on every thread.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use std::collections::HashSet;
use std::fmt;

/// Writes one field of `T` as a generic value (`[tag][payload]`).
pub type FieldWrite<T> = fn(&T, &mut Output<'_>) -> Result<(), Error>;

/// Reads one generic value into a field of `T`.
pub type FieldRead<T> = fn(&mut T, &mut Input<'_>) -> Result<(), Error>;

pub struct Field<T> {
    tag: Option<i32>,
    name: &'static str,
    write: FieldWrite<T>,
    read: FieldRead<T>,
}

impl<T> Field<T> {
    /// A field addressed by a stable numeric tag.
    pub fn tagged(tag: i32, name: &'static str, write: FieldWrite<T>, read: FieldRead<T>) -> Self {
        Field {
            tag: Some(tag),
            name,
            write,
            read,
        }
    }

    /// A field without a tag; only the all-fields codec sees it.
    pub fn untagged(name: &'static str, write: FieldWrite<T>, read: FieldRead<T>) -> Self {
        Field {
            tag: None,
            name,
            write,
            read,
        }
    }

    pub fn tag(&self) -> Option<i32> {
        self.tag
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    pub fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error> {
        (self.write)(value, out)
    }

    #[inline(always)]
    pub fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error> {
        (self.read)(value, input)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .finish()
    }
}

pub struct FieldTable<T> {
    type_name: &'static str,
    fields: Vec<Field<T>>,
    // indices into `fields`, ascending by tag
    by_tag: Vec<usize>,
}

impl<T> FieldTable<T> {
    /// Validates and indexes the fields of `type_name`.
    ///
    /// Two fields sharing a tag or a name is a registration error.
    pub fn new(type_name: &'static str, fields: Vec<Field<T>>) -> Result<Self, Error> {
        let mut names = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !names.insert(field.name) {
                return Err(Error::registration(format!(
                    "{type_name} declares field `{}` twice",
                    field.name
                )));
            }
        }
        let mut by_tag: Vec<usize> = (0..fields.len())
            .filter(|&i| fields[i].tag.is_some())
            .collect();
        by_tag.sort_by_key(|&i| fields[i].tag);
        for pair in by_tag.windows(2) {
            let (a, b) = (&fields[pair[0]], &fields[pair[1]]);
            if a.tag == b.tag {
                return Err(Error::registration(format!(
                    "{type_name}: fields `{}` and `{}` share tag {}",
                    a.name,
                    b.name,
                    a.tag.unwrap_or_default()
                )));
            }
        }
        Ok(FieldTable {
            type_name,
            fields,
            by_tag,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// Tagged fields with their tags, in ascending tag order.
    pub fn tagged(&self) -> impl Iterator<Item = (i32, &Field<T>)> + '_ {
        self.by_tag.iter().filter_map(move |&i| {
            let field = &self.fields[i];
            field.tag.map(|tag| (tag, field))
        })
    }

    pub fn tagged_len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn find_tag(&self, tag: i32) -> Option<&Field<T>> {
        self.by_tag
            .binary_search_by_key(&Some(tag), |&i| self.fields[i].tag)
            .ok()
            .map(|pos| &self.fields[self.by_tag[pos]])
    }

    pub fn position_of_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("type", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}
