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

use std::cell::RefCell;
use std::rc::Rc;
use tests::{init_logging, Node};
use weft::{DefaultStrategy, Error, Input, Output, Serializer, Weft};

mod v1 {
    use super::*;
    use weft::Weft;

    #[derive(Weft, Default, Debug, PartialEq)]
    pub struct Profile {
        #[weft(tag = 1)]
        pub name: String,
        #[weft(tag = 2)]
        pub age: i32,
    }

    #[derive(Weft, Default, Debug)]
    pub struct Holder {
        #[weft(tag = 2)]
        pub b: Option<Rc<RefCell<Node>>>,
    }
}

mod v2 {
    use super::*;
    use weft::Weft;

    #[derive(Weft, Default, Debug)]
    pub struct Holder {
        #[weft(tag = 1)]
        pub a: Option<Rc<RefCell<Node>>>,
        #[weft(tag = 2)]
        pub b: Option<Rc<RefCell<Node>>>,
    }

    #[derive(Weft, Default, Debug, PartialEq)]
    pub struct Profile {
        #[weft(tag = 1)]
        pub name: String,
        #[weft(tag = 2)]
        pub age: i32,
        #[weft(tag = 3)]
        pub email: String,
        #[weft(tag = 4)]
        pub friends: Vec<String>,
    }
}

fn pair_of_wefts(strategy: DefaultStrategy) -> (Weft, Weft) {
    let mut old = Weft::default();
    old.set_default_strategy(strategy);
    old.register::<v1::Profile>(500).unwrap();
    let mut new = Weft::default();
    new.set_default_strategy(strategy);
    new.register::<v2::Profile>(500).unwrap();
    (old, new)
}

fn newer_profile() -> v2::Profile {
    v2::Profile {
        name: "ada".to_string(),
        age: 36,
        email: "ada@example.org".to_string(),
        friends: vec!["charles".to_string()],
    }
}

#[test]
fn test_reader_drops_unknown_tags() {
    init_logging();
    let (old, new) = pair_of_wefts(DefaultStrategy::Tagged);
    let bytes = new.serialize(&newer_profile()).unwrap();
    let profile: v1::Profile = old.deserialize(&bytes).unwrap();
    assert_eq!(
        profile,
        v1::Profile {
            name: "ada".to_string(),
            age: 36,
        }
    );
}

#[test]
fn test_dropped_field_keeps_reference_ids_aligned() {
    let mut old = Weft::default();
    old.register::<Node>(201).unwrap();
    old.register::<v1::Holder>(510).unwrap();
    let mut new = Weft::default();
    new.register::<Node>(201).unwrap();
    new.register::<v2::Holder>(510).unwrap();

    let shared = Node::named("x");
    let bytes = new
        .serialize(&v2::Holder {
            a: Some(shared.clone()),
            b: Some(shared),
        })
        .unwrap();
    // the second field is a reference to the first one
    assert_eq!(&bytes[bytes.len() - 10..bytes.len() - 6], &[0, 0, 0, 2]);
    assert_eq!(&bytes[bytes.len() - 6..], &[0x00, 0x0a, 0, 0, 0, 1]);

    let holder: v1::Holder = old.deserialize(&bytes).unwrap();
    let node = holder.b.expect("aliased node");
    assert_eq!(node.borrow().name, "x");
    assert!(node.borrow().next.is_none());
}

#[test]
fn test_stream_with_fewer_tags_is_rejected() {
    let (old, new) = pair_of_wefts(DefaultStrategy::Tagged);
    let bytes = old
        .serialize(&v1::Profile {
            name: "bob".to_string(),
            age: 20,
        })
        .unwrap();
    let err = new.deserialize::<v2::Profile>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_all_fields_by_name() {
    let (old, new) = pair_of_wefts(DefaultStrategy::AllFields);
    let bytes = new.serialize(&newer_profile()).unwrap();
    // count, then the first field name
    assert_eq!(&bytes[2..6], &[0x00, 0x00, 0x00, 0x04]);
    assert_eq!(&bytes[6..12], &[0x00, 0x04, b'n', b'a', b'm', b'e']);
    let profile: v1::Profile = old.deserialize(&bytes).unwrap();
    assert_eq!(profile.name, "ada");

    let bytes = old.serialize(&profile).unwrap();
    let err = new.deserialize::<v2::Profile>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[derive(Weft, Default, Debug, PartialEq)]
struct Annotated {
    #[weft(tag = 1)]
    id: i32,
    note: String,
    #[weft(skip)]
    cache: Option<String>,
}

#[test]
fn test_untagged_fields_follow_the_strategy() {
    let mut tagged = Weft::default();
    tagged.register::<Annotated>(510).unwrap();
    let mut named = Weft::default();
    named.set_default_strategy(DefaultStrategy::AllFields);
    named.register::<Annotated>(510).unwrap();

    let value = Annotated {
        id: 9,
        note: "kept by name only".to_string(),
        cache: Some("never written".to_string()),
    };
    let through_tags = tagged.copy(&value).unwrap();
    assert_eq!(through_tags.id, 9);
    assert_eq!(through_tags.note, "");
    assert_eq!(through_tags.cache, None);

    let through_names = named.copy(&value).unwrap();
    assert_eq!(through_names.note, value.note);
    assert_eq!(through_names.cache, None);
}

#[derive(Weft, Default, Debug)]
struct Probe {
    #[weft(tag = 1)]
    hits: i32,
}

#[derive(Weft, Default, Debug)]
struct Gauge {
    #[weft(tag = 1)]
    level: i32,
}

#[test]
fn test_default_strategy_applies_per_registration() {
    let mut weft = Weft::default();
    let previous = weft.set_default_strategy(DefaultStrategy::Empty);
    assert_eq!(previous, DefaultStrategy::Tagged);
    weft.register::<Probe>(520).unwrap();
    weft.set_default_strategy(previous);
    weft.register::<Gauge>(521).unwrap();

    assert_eq!(weft.type_of(520).unwrap().strategy(), "empty");
    assert_eq!(weft.type_of(521).unwrap().strategy(), "tagged");

    let bytes = weft.serialize(&Probe { hits: 12 }).unwrap();
    assert_eq!(bytes, vec![0x02, 0x08]);
    assert_eq!(weft.deserialize::<Probe>(&bytes).unwrap().hits, 0);
    assert_eq!(weft.copy(&Gauge { level: 3 }).unwrap().level, 3);
}

mod tenths {
    use weft::{Error, Input, Output};

    pub fn write(value: &f64, out: &mut Output<'_>) -> Result<(), Error> {
        out.write(&((value * 10.0).round() as i32))
    }

    pub fn read(input: &mut Input<'_>) -> Result<f64, Error> {
        Ok(f64::from(input.read::<i32>()?) / 10.0)
    }
}

#[derive(Weft, Default, Debug)]
struct Reading {
    #[weft(tag = 1, with = "tenths")]
    celsius: f64,
}

#[test]
fn test_field_with_custom_codec() {
    let mut weft = Weft::default();
    weft.register::<Reading>(530).unwrap();
    let bytes = weft.serialize(&Reading { celsius: 21.46 }).unwrap();
    // tag 1 carries INT 215
    assert_eq!(&bytes[10..], &[0x00, 0x03, 0x00, 0x00, 0x00, 0xd7]);
    let reading: Reading = weft.deserialize(&bytes).unwrap();
    assert_eq!(reading.celsius, 21.5);
}

#[derive(Weft, Default, Debug, PartialEq)]
struct Ticket {
    #[weft(tag = 1)]
    serial: String,
    #[weft(tag = 2)]
    seat: i32,
}

fn create_ticket(input: &mut Input<'_>) -> Result<Ticket, Error> {
    Ok(Ticket {
        serial: input.read()?,
        seat: 0,
    })
}

fn write_ticket(ticket: &Ticket, out: &mut Output<'_>) -> Result<(), Error> {
    out.write(&ticket.serial)?;
    out.write(&ticket.seat)
}

fn read_ticket(ticket: &mut Ticket, input: &mut Input<'_>) -> Result<(), Error> {
    ticket.seat = input.read()?;
    Ok(())
}

#[test]
fn test_create_consumes_constructor_arguments() {
    let mut weft = Weft::default();
    weft.register_with(
        Some(540),
        Serializer::<Ticket>::new(create_ticket, write_ticket, read_ticket),
    )
    .unwrap();
    assert_eq!(weft.type_of(540).unwrap().strategy(), "custom");

    let ticket = Ticket {
        serial: "A-17".to_string(),
        seat: 42,
    };
    let bytes = weft.serialize(&ticket).unwrap();
    assert_eq!(
        bytes,
        vec![0x02, 0x1c, 0x00, 0x09, 0x00, 0x04, b'A', b'-', b'1', b'7', 0x00, 0x03, 0, 0, 0, 42]
    );
    assert_eq!(weft.deserialize::<Ticket>(&bytes).unwrap(), ticket);
}
