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

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::Primitive;

// Unsigned integers share the tag of the signed type of the same width.
macro_rules! impl_primitive {
    ($($ty:ident => $tag:ident),* $(,)?) => {
        paste::paste! {
            $(
                impl Persist for $ty {
                    #[inline(always)]
                    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
                        out.writer.write_u16(Primitive::$tag.id());
                        out.writer.[<write_ $ty>](*self);
                        Ok(())
                    }

                    #[inline(always)]
                    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
                        input.expect_primitive(tag, Primitive::$tag)?;
                        input.reader.[<read_ $ty>]()
                    }

                    #[inline(always)]
                    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
                        Ok(Primitive::$tag.id())
                    }
                }
            )*
        }
    };
}

impl_primitive! {
    i8 => Byte,
    u8 => Byte,
    i16 => Short,
    u16 => Short,
    i32 => Int,
    u32 => Int,
    i64 => Long,
    u64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Boolean,
}

/// A single UTF-16 code unit on the wire.
impl Persist for char {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        let unit = u16::try_from(*self as u32).map_err(|_| {
            Error::write_error(format!(
                "char U+{:04X} is outside the basic multilingual plane",
                *self as u32
            ))
        })?;
        out.writer.write_u16(Primitive::Char.id());
        out.writer.write_u16(unit);
        Ok(())
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        input.expect_primitive(tag, Primitive::Char)?;
        let unit = input.reader.read_u16()?;
        char::from_u32(unit as u32).ok_or_else(|| {
            Error::encoding_error(format!("lone surrogate {unit:#06x} in char value"))
        })
    }

    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
        Ok(Primitive::Char.id())
    }
}

impl Persist for String {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.writer.write_u16(Primitive::String.id());
        out.writer.write_utf(self)
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        input.expect_primitive(tag, Primitive::String)?;
        input.reader.read_utf()
    }

    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
        Ok(Primitive::String.id())
    }
}
