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
use tests::{init_logging, shapes_weft, Circle, Drawing, Label, Shape, Square};
use weft::{Error, TypeKind, Weft};

#[test]
fn test_trait_object_round_trip() {
    init_logging();
    let weft = shapes_weft().unwrap();
    let circle: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(Circle { radius: 1.0 }));
    let square: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(Square { side: 2.0 }));
    let drawing = Drawing {
        shapes: vec![circle.clone(), square, circle],
    };

    let decoded: Drawing = weft.copy(&drawing).unwrap();
    assert_eq!(decoded.shapes.len(), 3);
    assert!((decoded.shapes[0].borrow().area() - std::f64::consts::PI).abs() < 1e-9);
    assert_eq!(decoded.shapes[1].borrow().area(), 4.0);
    assert!(Rc::ptr_eq(&decoded.shapes[0], &decoded.shapes[2]));
    assert!(!Rc::ptr_eq(&decoded.shapes[0], &decoded.shapes[1]));

    let square = decoded.shapes[1].borrow();
    let square = square.as_any().downcast_ref::<Square>().unwrap();
    assert_eq!(square, &Square { side: 2.0 });
}

#[test]
fn test_non_subtype_is_rejected() {
    let weft = shapes_weft().unwrap();
    let label: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(Label {
        text: "north".to_string(),
    }));
    let bytes = weft.serialize(&Drawing { shapes: vec![label] }).unwrap();
    let err = weft.deserialize::<Drawing>(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "{err}");
}

#[test]
fn test_unregistered_concrete_type() {
    let mut weft = Weft::default();
    weft.register_abstract::<dyn Shape>(300).unwrap();
    weft.register::<Drawing>(304).unwrap();
    let circle: Rc<RefCell<dyn Shape>> = Rc::new(RefCell::new(Circle { radius: 3.0 }));
    let err = weft
        .serialize(&Drawing {
            shapes: vec![circle],
        })
        .unwrap_err();
    assert!(err.is_registration_error(), "{err}");
}

#[test]
fn test_abstract_record() {
    let weft = shapes_weft().unwrap();
    let record = weft.type_of(300).unwrap();
    assert_eq!(record.kind(), TypeKind::Abstract);
    assert!(record.harness().is_none());
    assert_eq!(weft.id_of::<dyn Shape>().unwrap(), 300);
    assert!(weft.registry().is_subtype::<dyn Shape>(std::any::TypeId::of::<Circle>()));
    assert!(!weft.registry().is_subtype::<dyn Shape>(std::any::TypeId::of::<Label>()));
}

#[test]
fn test_subtype_requires_abstract_target() {
    let mut weft = shapes_weft().unwrap();
    let err = weft
        .register_subtype::<Circle, Circle>(|circle| circle)
        .unwrap_err();
    assert!(err.is_registration_error(), "{err}");

    let err = weft
        .register_subtype::<dyn Shape, Circle>(tests::circle_as_shape)
        .unwrap_err();
    assert!(err.is_registration_error(), "{err}");
}

#[test]
fn test_concrete_handle_decodes_as_value() {
    let weft = shapes_weft().unwrap();
    let circle = Rc::new(RefCell::new(Circle { radius: 0.5 }));
    let value = weft
        .deserialize_value(&weft.serialize(&circle).unwrap())
        .unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.type_id(), 301);
    let decoded = object.downcast::<Circle>().unwrap();
    assert_eq!(decoded.borrow().radius, 0.5);
}
