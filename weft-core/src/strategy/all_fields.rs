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

/// Field codec addressing every field by its declared name.
///
/// Payload: `[count:i32]` then `[utf name][generic value]` per field in
/// declaration order. Unknown names are dropped, but every field the reader
/// declares must be present.
pub struct AllFields<T> {
    fields: Arc<FieldTable<T>>,
}

impl<T> AllFields<T> {
    pub fn new(fields: Arc<FieldTable<T>>) -> Self {
        AllFields { fields }
    }
}

impl<T: 'static> WriteStrategy<T> for AllFields<T> {
    fn write(&self, value: &T, out: &mut Output<'_>) -> Result<(), Error> {
        let fields = self.fields.fields();
        out.writer.write_i32(fields.len() as i32);
        for field in fields {
            out.writer.write_utf(field.name())?;
            field.write(value, out)?;
        }
        Ok(())
    }
}

impl<T: 'static> ReadStrategy<T> for AllFields<T> {
    fn read(&self, value: &mut T, input: &mut Input<'_>) -> Result<(), Error> {
        let type_name = self.fields.type_name();
        let fields = self.fields.fields();
        let count = input.reader.read_i32()?;
        crate::ensure!(count >= 0, "{}: negative field count {}", type_name, count);
        let mut seen = vec![false; fields.len()];
        for _ in 0..count {
            let name = input.reader.read_utf()?;
            match self.fields.position_of_name(&name) {
                Some(pos) => {
                    fields[pos].read(value, input)?;
                    seen[pos] = true;
                }
                None => {
                    let dropped = input.read_value()?;
                    log::warn!(
                        "{type_name}: discarding unknown field `{name}` ({})",
                        dropped.kind()
                    );
                }
            }
        }
        if let Some(pos) = seen.iter().position(|s| !s) {
            return Err(Error::invalid_data(format!(
                "{type_name}: field `{}` is missing from the stream",
                fields[pos].name()
            )));
        }
        Ok(())
    }
}
