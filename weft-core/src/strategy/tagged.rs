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

use super::{ReadStrategy, WriteStrategy};
use crate::error::Error;
use crate::meta::FieldTable;
use crate::resolver::context::{Input, Output};
use std::sync::Arc;

/// Field codec addressing fields by their declared numeric tag.
///
/// Payload: `[count:i32]` then `[tag:i32][generic value]` per field, ascending
/// by tag. A reader whose type declares fewer fields than the stream carries
/// decodes and drops the unknown ones; a stream carrying fewer fields than the
/// reader declares is rejected.
pub struct TaggedFields<T> {
    fields: Arc<FieldTable<T>>,
}

impl<T> TaggedFields<T> {
    pub fn new(fields: Arc<FieldTable<T>>) -> Self {
        TaggedFields { fields }
    }
}

impl<T: 'static> WriteStrategy<T> for TaggedFields<T> {
    fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error> {
        out.writer.write_i32(self.fields.tagged_len() as i32);
        for (tag, field) in self.fields.tagged() {
            out.writer.write_i32(tag);
            field.write(value, out)?;
        }
        Ok(())
    }
}

impl<T: 'static> ReadStrategy<T> for TaggedFields<T> {
    fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error> {
        let type_name = self.fields.type_name();
        let count = input.reader.read_i32()?;
        crate::ensure!(count >= 0, "{}: negative field count {}", type_name, count);
        let declared = self.fields.tagged_len();
        if (count as usize) < declared {
            return Err(Error::invalid_data(format!(
                "{type_name}: stream carries {count} fields but the type declares {declared}"
            )));
        }
        for _ in 0..count {
            let tag = input.reader.read_i32()?;
            match self.fields.find_tag(tag) {
                Some(field) => field.read(value, input)?,
                None => {
                    let dropped = input.read_value()?;
                    log::warn!(
                        "{type_name}: discarding field with unknown tag {tag} ({})",
                        dropped.kind()
                    );
                }
            }
        }
        Ok(())
    }
}
