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

//! A small self-referencing object encoded once at startup, so the first real
//! encode does not pay for cold code paths.

use crate::error::Error;
use crate::meta::{Field, FieldTable};
use crate::resolver::context::{Input, Output};
use crate::resolver::type_registry::TypeRegistry;
use crate::serializer::{Object, Persist, Shared};
use crate::strategy::{DefaultStrategy, Serializer};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
pub(crate) struct Warmup {
    label: String,
    weight: i64,
    next: Option<Rc<RefCell<Warmup>>>,
}

impl Persist for Warmup {
    fn persist_write(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.write_object(self)
    }

    fn persist_read_tagged(input: &mut Input<'_>, tag: u16) -> Result<Self, Error> {
        input.read_object(tag)
    }

    fn persist_type_id(registry: &TypeRegistry) -> Result<u16, Error> {
        registry.id_of::<Self>()
    }
}

impl Object for Warmup {
    fn type_name() -> &'static str {
        "warmup"
    }

    fn default_serializer(_: DefaultStrategy) -> Result<Serializer<Self>, Error> {
        let fields = FieldTable::new(
            "warmup",
            vec![
                Field::<Warmup>::tagged(
                    1,
                    "label",
                    |w, out| out.write(&w.label),
                    |w, input| {
                        w.label = input.read()?;
                        Ok(())
                    },
                ),
                Field::<Warmup>::tagged(
                    2,
                    "weight",
                    |w, out| out.write(&w.weight),
                    |w, input| {
                        w.weight = input.read()?;
                        Ok(())
                    },
                ),
                Field::<Warmup>::tagged(
                    3,
                    "next",
                    |w, out| out.write(&w.next),
                    |w, input| {
                        w.next = input.read()?;
                        Ok(())
                    },
                ),
            ],
        )?;
        Ok(Serializer::tagged(fields))
    }
}

impl Shared for Warmup {
    fn write_shared(&self, out: &mut Output<'_>) -> Result<(), Error> {
        out.write_object(self)
    }

    fn read_shared(input: &mut Input<'_>, tag: u16) -> Result<Rc<RefCell<Self>>, Error> {
        input.read_object_shared(tag)
    }
}

/// Round-trips a one-node cycle through `encode` and `decode`.
pub(crate) fn run<E, D>(encode: E, decode: D) -> Result<(), Error>
where
    E: FnOnce(&Rc<RefCell<Warmup>>) -> Result<Vec<u8>, Error>,
    D: FnOnce(&[u8]) -> Result<Rc<RefCell<Warmup>>, Error>,
{
    let node = Rc::new(RefCell::new(Warmup {
        label: "warmup".to_string(),
        weight: 1,
        next: None,
    }));
    node.borrow_mut().next = Some(node.clone());
    let encoded = encode(&node);
    node.borrow_mut().next = None;
    let decoded = decode(&encoded?)?;
    let next = decoded.borrow_mut().next.take();
    let cyclic = next.is_some_and(|next| Rc::ptr_eq(&next, &decoded));
    crate::ensure!(cyclic, "warm-up graph lost its cycle");
    Ok(())
}
