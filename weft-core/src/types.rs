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

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Wire tags of the primitive values. Their order is fixed by the format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum Primitive {
    Null = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    Char = 7,
    Boolean = 8,
    String = 9,
}

impl Primitive {
    pub const ALL: [Primitive; 10] = [
        Primitive::Null,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Char,
        Primitive::Boolean,
        Primitive::String,
    ];

    #[inline(always)]
    pub const fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Primitive> {
        Primitive::try_from(id).ok()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
            Primitive::Boolean => "boolean",
            Primitive::String => "string",
        }
    }
}

pub const NULL: u16 = Primitive::Null.id();

/// Followed by a 4-byte reference id of an instance written earlier in the stream.
pub const REFERENCE_MARKER: u16 = Primitive::String.id() + 1;

/// Ids the engine registers for itself, immediately after the reserved range.
pub mod builtin {
    use super::REFERENCE_MARKER;

    pub const ARRAY: u16 = REFERENCE_MARKER + 1;
    pub const LIST: u16 = REFERENCE_MARKER + 2;
    pub const SET: u16 = REFERENCE_MARKER + 3;
    pub const MAP: u16 = REFERENCE_MARKER + 4;
    pub const PAIR: u16 = REFERENCE_MARKER + 5;
    pub const WARMUP: u16 = REFERENCE_MARKER + 6;

    pub const LAST: u16 = WARMUP;
}

/// First id handed out by automatic registration.
pub const FIRST_APPLICATION_ID: u16 = builtin::LAST + 1;

#[inline(always)]
pub const fn is_primitive(id: u16) -> bool {
    id < REFERENCE_MARKER
}

/// Primitive tags and the reference marker can never be registered.
#[inline(always)]
pub const fn is_reserved(id: u16) -> bool {
    id <= REFERENCE_MARKER
}
