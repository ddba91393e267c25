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

//! Big-endian byte buffers.
//!
//! Every multi-byte integer on the wire is big-endian, and strings use the
//! length-prefixed modified UTF-8 layout of a Java `DataOutput::writeUTF`.

use crate::error::Error;
use byteorder::{BigEndian, ByteOrder};

/// Longest encoded string a `u16` length prefix can describe.
pub const MAX_UTF_LEN: usize = u16::MAX as usize;

macro_rules! writer_fixed {
    ($($name:ident: $ty:ty => $put:ident, $size:expr;)*) => {
        $(
            #[inline(always)]
            pub fn $name(&mut self, value: $ty) {
                let mut scratch = [0u8; $size];
                BigEndian::$put(&mut scratch, value);
                self.bf.extend_from_slice(&scratch);
            }
        )*
    };
}

macro_rules! reader_fixed {
    ($($name:ident: $ty:ty => $get:ident, $size:expr;)*) => {
        $(
            #[inline(always)]
            pub fn $name(&mut self) -> Result<$ty, Error> {
                Ok(BigEndian::$get(self.take($size)?))
            }
        )*
    };
}

#[derive(Default, Debug)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    /// Wraps an existing buffer, appending after its current contents.
    pub fn from_vec(bf: Vec<u8>) -> Writer {
        Writer { bf }
    }

    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    writer_fixed! {
        write_u16: u16 => write_u16, 2;
        write_i16: i16 => write_i16, 2;
        write_u32: u32 => write_u32, 4;
        write_i32: i32 => write_i32, 4;
        write_i64: i64 => write_i64, 8;
        write_u64: u64 => write_u64, 8;
        write_f32: f32 => write_f32, 4;
        write_f64: f64 => write_f64, 8;
    }

    /// Writes `[len:u16][modified UTF-8 bytes]`.
    ///
    /// NUL is written as the two-byte form `C0 80` and characters outside the
    /// basic multilingual plane as two three-byte surrogates.
    pub fn write_utf(&mut self, s: &str) -> Result<(), Error> {
        let encoded_len = modified_utf8_len(s);
        if encoded_len > MAX_UTF_LEN {
            return Err(Error::write_error(format!(
                "string of {encoded_len} encoded bytes exceeds the {MAX_UTF_LEN} byte limit"
            )));
        }
        self.write_u16(encoded_len as u16);
        self.bf.reserve(encoded_len);
        for unit in s.encode_utf16() {
            match unit {
                0x0001..=0x007F => self.bf.push(unit as u8),
                0x0000 | 0x0080..=0x07FF => {
                    self.bf.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                    self.bf.push(0x80 | (unit & 0x3F) as u8);
                }
                _ => {
                    self.bf.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                    self.bf.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                    self.bf.push(0x80 | (unit & 0x3F) as u8);
                }
            }
        }
        Ok(())
    }
}

fn modified_utf8_len(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

#[derive(Debug)]
pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    pub fn slice_after_cursor(&self) -> &'a [u8] {
        &self.bf[self.cursor..]
    }

    #[inline(always)]
    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self.cursor + len;
        if end > self.bf.len() {
            return Err(Error::buffer_out_of_bound(self.cursor, len, self.bf.len()));
        }
        let slice = &self.bf[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.take(len)
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    /// Any non-zero byte reads as `true`, like `DataInput::readBoolean`.
    #[inline(always)]
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    reader_fixed! {
        read_u16: u16 => read_u16, 2;
        read_i16: i16 => read_i16, 2;
        read_u32: u32 => read_u32, 4;
        read_i32: i32 => read_i32, 4;
        read_i64: i64 => read_i64, 8;
        read_u64: u64 => read_u64, 8;
        read_f32: f32 => read_f32, 4;
        read_f64: f64 => read_f64, 8;
    }

    /// Reads a string written by [`Writer::write_utf`].
    pub fn read_utf(&mut self) -> Result<String, Error> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        let mut units = Vec::with_capacity(len);
        let mut i = 0;
        while i < bytes.len() {
            let b0 = bytes[i] as u16;
            if b0 & 0x80 == 0 {
                units.push(b0);
                i += 1;
            } else if b0 & 0xE0 == 0xC0 {
                let b1 = continuation(bytes, i + 1)?;
                units.push(((b0 & 0x1F) << 6) | b1);
                i += 2;
            } else if b0 & 0xF0 == 0xE0 {
                let b1 = continuation(bytes, i + 1)?;
                let b2 = continuation(bytes, i + 2)?;
                units.push(((b0 & 0x0F) << 12) | (b1 << 6) | b2);
                i += 3;
            } else {
                return Err(Error::encoding_error(format!(
                    "malformed modified UTF-8 lead byte {b0:#04x} at offset {i}"
                )));
            }
        }
        String::from_utf16(&units)
            .map_err(|e| Error::encoding_error(format!("invalid UTF-16 in string: {e}")))
    }
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16, Error> {
    match bytes.get(index) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        Some(b) => Err(Error::encoding_error(format!(
            "malformed modified UTF-8 continuation byte {b:#04x} at offset {index}"
        ))),
        None => Err(Error::encoding_error("truncated modified UTF-8 sequence")),
    }
}
