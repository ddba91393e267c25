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

//! Fieldless enums, written as the ordinal of their variant.
//!
//! Decoding never constructs a variant; it returns the one at the decoded
//! ordinal.

use crate::error::Error;
use crate::resolver::context::{Input, Output};
use crate::strategy::{NoOp, Serializer};

pub trait Enumeration: Sized + Clone + 'static {
    /// Every variant, indexed by ordinal.
    fn variants() -> &'static [Self];

    fn ordinal(&self) -> u32;
}

fn create<E: Enumeration>(input: &mut Input<'_>) -> Result<E, Error> {
    let ordinal = input.read::<i32>()?;
    usize::try_from(ordinal)
        .ok()
        .and_then(|index| E::variants().get(index))
        .cloned()
        .ok_or_else(|| {
            Error::invalid_data(format!(
                "ordinal {ordinal} is out of range for {} ({} variants)",
                std::any::type_name::<E>(),
                E::variants().len()
            ))
        })
}

fn write<E: Enumeration>(value: &E, out: &mut Output<'_>) -> Result<(), Error> {
    out.write(&(value.ordinal() as i32))
}

/// The serializer of every enumeration: the payload is a generic INT ordinal.
pub fn enumeration_serializer<E: Enumeration>() -> Serializer<E> {
    Serializer::new(create::<E>, write::<E>, NoOp).labelled("enumeration")
}
