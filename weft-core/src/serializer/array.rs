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

//! Arrays: `[count:i32][component:i32]` then the elements, where every run of
//! consecutive nulls is a single `[NULL][run:i32]`.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::Persist;
use crate::types::{builtin, NULL};

/// Writes the array payload; `None` items are nulls. Callers also pass `None`
/// for present elements that would encode as a bare NULL tag.
pub(crate) fn write_elements<'v, E, I, F>(
    out: &mut Output<'_>,
    component: u16,
    len: usize,
    elements: I,
    mut write: F,
) -> Result<(), Error>
where
    E: ?Sized + 'v,
    I: Iterator<Item = Option<&'v E>>,
    F: FnMut(&E, &mut Output<'_>) -> Result<(), Error>,
{
    let count = i32::try_from(len)
        .map_err(|_| Error::write_error(format!("array of {len} elements is too long")))?;
    out.writer.write_i32(count);
    out.writer.write_i32(component as i32);
    let mut nulls = 0i32;
    for element in elements {
        match element {
            None => nulls += 1,
            Some(value) => {
                flush_nulls(out, &mut nulls);
                write(value, out)?;
            }
        }
    }
    flush_nulls(out, &mut nulls);
    Ok(())
}

#[inline(always)]
fn flush_nulls(out: &mut Output<'_>, nulls: &mut i32) {
    if *nulls > 0 {
        out.writer.write_u16(NULL);
        out.writer.write_i32(*nulls);
        *nulls = 0;
    }
}

/// Reads `[count][component]`.
pub(crate) fn read_header(input: &mut Input<'_>) -> Result<(usize, u16), Error> {
    let count = input.reader.read_i32()?;
    crate::ensure!(count >= 0, "negative array length {}", count);
    let component = input.reader.read_i32()?;
    let component = u16::try_from(component)
        .map_err(|_| Error::invalid_data(format!("array component id {component}")))?;
    Ok((count as usize, component))
}

/// One step of an array body: an element whose tag was read, or a run of nulls.
pub(crate) enum ArrayItem {
    Element(u16),
    Nulls(usize),
}

/// Reads `count` elements, calling `visit` once per element and once per run
/// of nulls.
pub(crate) fn read_elements<F>(input: &mut Input<'_>, count: usize, mut visit: F) -> Result<(), Error>
where
    F: FnMut(&mut Input<'_>, ArrayItem) -> Result<(), Error>,
{
    let mut filled = 0usize;
    while filled < count {
        let tag = input.read_tag()?;
        if tag == NULL {
            let run = input.reader.read_i32()?;
            crate::ensure!(
                run > 0 && run as usize <= count - filled,
                "null run of {} at index {} overflows an array of {}",
                run,
                filled,
                count
            );
            visit(input, ArrayItem::Nulls(run as usize))?;
            filled += run as usize;
        } else {
            visit(input, ArrayItem::Element(tag))?;
            filled += 1;
        }
    }
    Ok(())
}

impl<T: Persist> Persist for Box<[Option<T>]> {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        let component = T::persist_type_id(out.registry())?;
        out.write_builtin(builtin::ARRAY, |out| {
            write_elements(
                out,
                component,
                self.len(),
                self.iter()
                    .map(|element| element.as_ref().filter(|v| !v.encodes_as_null())),
                |value, out| value.persist_write(out),
            )
        })
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        let expected = T::persist_type_id(input.registry())?;
        input.read_builtin(tag, builtin::ARRAY, |input| {
            let (count, component) = read_header(input)?;
            if expected != NULL && component != expected {
                return Err(Error::type_mismatch(format!(
                    "array of component id {component} read as {}",
                    std::any::type_name::<T>()
                )));
            }
            let mut elements = Vec::with_capacity(count.min(input.remaining()));
            read_elements(input, count, |input, item| {
                match item {
                    ArrayItem::Element(tag) => {
                        elements.push(Some(T::persist_read_tagged(input, tag)?))
                    }
                    ArrayItem::Nulls(run) => {
                        elements.extend(std::iter::repeat_with(|| None).take(run))
                    }
                }
                Ok(())
            })?;
            Ok(elements.into_boxed_slice())
        })
    }

    fn persist_type_id(_: &TypeRegistry) -> Result<u16, Error> {
        Ok(builtin::ARRAY)
    }
}
