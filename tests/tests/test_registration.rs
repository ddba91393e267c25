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

use tests::{init_logging, Color, Point};
use weft::{Error, TypeKind, Weft};

#[test]
fn test_reserved_ids() {
    init_logging();
    let mut weft = Weft::default();
    for id in [0, 3, 9, 10] {
        let err = weft.register::<Point>(id).unwrap_err();
        assert!(err.is_registration_error(), "{err}");
    }
    // built-in ids are taken rather than reserved
    let err = weft.register::<Point>(11).unwrap_err();
    assert!(matches!(err, Error::Registration(_)), "{err}");
    assert!(weft.id_of::<Point>().is_err());
}

#[test]
fn test_taken_id_and_duplicate_type() {
    let mut weft = Weft::default();
    assert_eq!(weft.register::<Point>(200).unwrap(), 200);
    let err = weft.register::<Color>(200).unwrap_err();
    assert!(err.is_registration_error(), "{err}");
    let err = weft.register::<Point>(201).unwrap_err();
    assert!(err.is_registration_error(), "{err}");
    assert!(weft.type_of(201).is_none());
}

#[test]
fn test_automatic_ids() {
    let mut weft = Weft::default();
    assert_eq!(weft.register::<Color>(17).unwrap(), 17);
    assert_eq!(weft.register_auto::<Point>().unwrap(), 18);
    assert_eq!(weft.id_of::<Point>().unwrap(), 18);
}

#[test]
fn test_builtin_records() {
    let weft = Weft::default();
    for (id, name) in [(11, "array"), (12, "list"), (13, "set"), (14, "map"), (15, "pair")] {
        let record = weft.type_of(id).unwrap();
        assert_eq!(record.name(), name);
        assert_eq!(record.kind(), TypeKind::Builtin);
    }
    assert!(weft.type_of(16).is_some());
    assert!(weft.type_of(17).is_none());
}

#[test]
fn test_closure_types_are_rejected() {
    let register = || {
        #[derive(Weft, Default)]
        struct Local {
            #[weft(tag = 1)]
            value: i32,
        }
        let mut weft = Weft::default();
        weft.register::<Local>(600)
    };
    let err = register().unwrap_err();
    assert!(err.is_registration_error(), "{err}");
}

#[test]
fn test_unregistered_type() {
    let weft = Weft::default();
    let err = weft.serialize(&Point { x: 0, y: 0 }).unwrap_err();
    assert!(matches!(err, Error::UnregisteredType(_)), "{err}");

    let mut other = Weft::default();
    other.register::<Point>(200).unwrap();
    let bytes = other.serialize(&Point { x: 0, y: 0 }).unwrap();
    let err = weft.deserialize::<Point>(&bytes).unwrap_err();
    assert!(err.is_registration_error(), "{err}");
    let err = weft.deserialize_value(&bytes).unwrap_err();
    assert!(matches!(err, Error::UnknownTypeId(200)), "{err}");
}

#[test]
fn test_records_are_listed() {
    let mut weft = Weft::default();
    weft.register::<Point>(200).unwrap();
    let record = weft.type_of(200).unwrap();
    assert_eq!(record.name(), "Point");
    assert_eq!(record.kind(), TypeKind::Object);
    assert_eq!(record.strategy(), "tagged");
    assert!(weft
        .registry()
        .records()
        .any(|record| record.rust_type() == std::any::TypeId::of::<Point>()));
}
