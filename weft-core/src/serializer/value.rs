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

//! Values decoded without a static type.
//!
//! [`Input::read_value`] turns any well-formed value into a [`Value`]. Unknown
//! fields are consumed this way, so decoding stays aligned even when the
//! reader does not know what it skips. Objects are kept as type-erased shared
//! handles, and writing a `Value` back preserves their aliasing.

use super::array::{read_elements, read_header, write_elements, ArrayItem};
use super::collection::write_size;
use super::pair::{read_pair_tagged, write_pair};
use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::{builtin, Primitive, NULL, REFERENCE_MARKER};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// A UTF-16 code unit.
    Char(u16),
    Boolean(bool),
    String(String),
    Array { component: u16, elements: Vec<Value> },
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Pair(Box<Value>, Box<Value>),
    Object(DynObject),
}

/// A registered object behind a type-erased shared handle.
#[derive(Clone)]
pub struct DynObject {
    type_id: u16,
    name: &'static str,
    handle: Rc<dyn Any>,
}

impl DynObject {
    pub fn new<T: 'static>(type_id: u16, name: &'static str, handle: Rc<RefCell<T>>) -> Self {
        DynObject {
            type_id,
            name,
            handle,
        }
    }

    /// Wire id of the object's type.
    pub fn type_id(&self) -> u16 {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn handle(&self) -> &Rc<dyn Any> {
        &self.handle
    }

    /// The typed handle, when the object is a `T`.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        self.handle.clone().downcast::<RefCell<T>>().ok()
    }

    pub fn ptr_eq(&self, other: &DynObject) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

/// Objects compare by identity.
impl PartialEq for DynObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{:p}",
            self.name,
            self.type_id,
            Rc::as_ptr(&self.handle) as *const ()
        )
    }
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Array { .. } => "array",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Pair(..) => "pair",
            Value::Object(object) => object.name,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Any integer, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DynObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Elements of an array, list or set.
    pub fn as_elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array { elements, .. } | Value::List(elements) | Value::Set(elements) => {
                Some(elements)
            }
            _ => None,
        }
    }

    fn write_sequence(out: &mut Output<'_>, id: u16, items: &[Value]) -> Result<(), Error> {
        out.write_builtin(id, |out| {
            write_size(out, items.len())?;
            for item in items {
                item.persist_write(out)?;
            }
            Ok(())
        })
    }

    fn read_sequence(input: &mut Input<'_>, tag: u16) -> Result<Vec<Value>, Error> {
        input.read_builtin(tag, tag, |input| {
            let size = input.reader.read_u16()?;
            (0..size).map(|_| input.read_value()).collect()
        })
    }

    fn read_object(input: &mut Input<'_>, tag: u16) -> Result<Value, Error> {
        let (handle, type_id) = input.read_shared_any(tag)?;
        let name = input
            .registry()
            .type_of(type_id)
            .map_or("object", |record| record.name());
        Ok(Value::Object(DynObject {
            type_id,
            name,
            handle,
        }))
    }
}

impl Persist for Value {
    fn encodes_as_null(&self) -> bool {
        self.is_null()
    }

    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        match self {
            Value::Null => {
                out.write_null();
                Ok(())
            }
            Value::Byte(v) => v.persist_write(out),
            Value::Short(v) => v.persist_write(out),
            Value::Int(v) => v.persist_write(out),
            Value::Long(v) => v.persist_write(out),
            Value::Float(v) => v.persist_write(out),
            Value::Double(v) => v.persist_write(out),
            Value::Char(unit) => {
                out.writer.write_u16(Primitive::Char.id());
                out.writer.write_u16(*unit);
                Ok(())
            }
            Value::Boolean(v) => v.persist_write(out),
            Value::String(v) => v.persist_write(out),
            Value::Array {
                component,
                elements,
            } => out.write_builtin(builtin::ARRAY, |out| {
                write_elements(
                    out,
                    *component,
                    elements.len(),
                    elements.iter().map(|e| (!e.encodes_as_null()).then_some(e)),
                    |element, out| element.persist_write(out),
                )
            }),
            Value::List(items) => Self::write_sequence(out, builtin::LIST, items),
            Value::Set(items) => Self::write_sequence(out, builtin::SET, items),
            Value::Map(entries) => out.write_builtin(builtin::MAP, |out| {
                write_size(out, entries.len())?;
                for (key, value) in entries {
                    write_pair(out, key, value)?;
                }
                Ok(())
            }),
            Value::Pair(first, second) => write_pair(out, &**first, &**second),
            Value::Object(object) => {
                let record = out
                    .registry()
                    .type_of(object.type_id)
                    .ok_or_else(|| Error::unregistered_type(format!("type id {}", object.type_id)))?;
                let harness = *record.harness().ok_or_else(|| {
                    Error::write_error(format!("{} cannot be written by itself", record.name()))
                })?;
                let addr = Rc::as_ptr(&object.handle) as *const () as usize;
                out.write_shared_handle(addr, |out| harness.write_cell(&*object.handle, out))
            }
        }
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        if let Some(primitive) = Primitive::from_id(tag) {
            let reader = &mut input.reader;
            return Ok(match primitive {
                Primitive::Null => Value::Null,
                Primitive::Byte => Value::Byte(reader.read_i8()?),
                Primitive::Short => Value::Short(reader.read_i16()?),
                Primitive::Int => Value::Int(reader.read_i32()?),
                Primitive::Long => Value::Long(reader.read_i64()?),
                Primitive::Float => Value::Float(reader.read_f32()?),
                Primitive::Double => Value::Double(reader.read_f64()?),
                Primitive::Char => Value::Char(reader.read_u16()?),
                Primitive::Boolean => Value::Boolean(reader.read_bool()?),
                Primitive::String => Value::String(reader.read_utf()?),
            });
        }
        match tag {
            REFERENCE_MARKER => Self::read_object(input, tag),
            builtin::ARRAY => input.read_builtin(tag, builtin::ARRAY, |input| {
                let (count, component) = read_header(input)?;
                let mut elements = Vec::with_capacity(count.min(input.remaining()));
                read_elements(input, count, |input, item| {
                    match item {
                        ArrayItem::Element(tag) => {
                            elements.push(Value::persist_read_tagged(input, tag)?)
                        }
                        ArrayItem::Nulls(run) => {
                            elements.extend(std::iter::repeat(Value::Null).take(run))
                        }
                    }
                    Ok(())
                })?;
                Ok(Value::Array {
                    component,
                    elements,
                })
            }),
            builtin::LIST => Self::read_sequence(input, tag).map(Value::List),
            builtin::SET => Self::read_sequence(input, tag).map(Value::Set),
            builtin::MAP => input.read_builtin(tag, builtin::MAP, |input| {
                let size = input.reader.read_u16()?;
                let mut entries = Vec::with_capacity(size as usize);
                for _ in 0..size {
                    let tag = input.read_tag()?;
                    entries.push(read_pair_tagged(input, tag, |input| {
                        Ok((input.read_value()?, input.read_value()?))
                    })?);
                }
                Ok(Value::Map(entries))
            }),
            builtin::PAIR => read_pair_tagged(input, tag, |input| {
                let first = input.read_value()?;
                let second = input.read_value()?;
                Ok(Value::Pair(Box::new(first), Box::new(second)))
            }),
            _ => Self::read_object(input, tag),
        }
    }

    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
        Ok(NULL)
    }
}
