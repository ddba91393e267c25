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
use std::thread;
use tests::{init_logging, Node, Point};
use weft::{Config, Error, Value, Weft};

fn point_weft() -> Weft {
    let mut weft = Weft::default();
    weft.register::<Point>(200).unwrap();
    weft.register::<Node>(201).unwrap();
    weft
}

#[test]
fn test_warmup() {
    init_logging();
    let weft = Weft::default().trace(true);
    weft.warmup().unwrap();
    weft.warmup().unwrap();
}

#[test]
fn test_copy_is_deep() {
    let weft = point_weft();
    let head = Node::named("head");
    head.borrow_mut().next = Some(Node::named("tail"));
    let copy = weft.copy(&head).unwrap();
    assert!(!Rc::ptr_eq(&copy, &head));
    copy.borrow_mut().name = "copy".to_string();
    assert_eq!(head.borrow().name, "head");
    let tail = copy.borrow().next.clone().unwrap();
    assert_eq!(tail.borrow().name, "tail");
}

#[test]
fn test_concurrent_copies() {
    let weft = point_weft();
    thread::scope(|scope| {
        for t in 0..8 {
            let weft = &weft;
            scope.spawn(move || {
                for i in 0..200 {
                    let point = Point { x: t, y: i };
                    assert_eq!(weft.copy(&point).unwrap(), point);
                    let node = Node::named(&format!("{t}-{i}"));
                    node.borrow_mut().next = Some(node.clone());
                    let copy = weft.copy(&node).unwrap();
                    node.borrow_mut().next = None;
                    let next = copy.borrow_mut().next.take().unwrap();
                    assert!(Rc::ptr_eq(&next, &copy));
                }
            });
        }
    });
}

#[test]
fn test_depth_limit() {
    let weft = Weft::new(Config {
        max_depth: 3,
        ..Config::default()
    });
    let shallow = vec![vec![vec![1i32]]];
    assert_eq!(weft.copy(&shallow).unwrap(), shallow);

    let deep = vec![vec![vec![vec![1i32]]]];
    let err = weft.serialize(&deep).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{err}");

    let bytes = Weft::default().serialize(&deep).unwrap();
    let err = weft.deserialize::<Vec<Vec<Vec<Vec<i32>>>>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{err}");
}

#[test]
fn test_cycles_do_not_count_as_depth() {
    let mut weft = Weft::default().max_depth(2);
    weft.register::<Node>(201).unwrap();
    let node = Node::named("self");
    node.borrow_mut().next = Some(node.clone());
    let copy = weft.copy(&node).unwrap();
    node.borrow_mut().next = None;
    copy.borrow_mut().next = None;
}

#[test]
fn test_trailing_bytes() {
    let weft = point_weft();
    let mut bytes = weft.serialize(&Point { x: 1, y: 1 }).unwrap();
    bytes.push(0xff);
    let err = weft.deserialize::<Point>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");

    let mut lenient = Weft::default().reject_trailing_bytes(false);
    lenient.register::<Point>(200).unwrap();
    assert_eq!(
        lenient.deserialize::<Point>(&bytes).unwrap(),
        Point { x: 1, y: 1 }
    );
}

#[test]
fn test_serialize_into_appends() {
    let weft = point_weft();
    let mut bytes = vec![0xaa];
    weft.serialize_into(&7i32, &mut bytes).unwrap();
    assert_eq!(bytes, vec![0xaa, 0x00, 0x03, 0, 0, 0, 7]);

    let err = weft.serialize_into(&'🦀', &mut bytes).unwrap_err();
    assert!(err.is_write_error());
    assert_eq!(bytes.len(), 7);
}

#[test]
fn test_stream_of_values() {
    let weft = point_weft();
    let shared = Node::named("shared");

    let mut out = weft.output();
    out.write(&shared).unwrap();
    out.write(&shared).unwrap();
    out.clear_references();
    out.write(&shared).unwrap();
    out.write(&Point { x: 2, y: 2 }).unwrap();
    let bytes = out.finish();

    let mut input = weft.input(&bytes);
    let first: Rc<RefCell<Node>> = input.read().unwrap();
    let second: Rc<RefCell<Node>> = input.read().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    input.clear_references();
    let third: Rc<RefCell<Node>> = input.read().unwrap();
    assert!(!Rc::ptr_eq(&first, &third));
    assert_eq!(input.read::<Point>().unwrap(), Point { x: 2, y: 2 });
    assert_eq!(input.remaining(), 0);
}

#[test]
fn test_dynamic_values() {
    let weft = point_weft();
    let bytes = weft.serialize(&Point { x: 8, y: 9 }).unwrap();
    let value = weft.deserialize_value(&bytes).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.name(), "Point");
    let point = object.downcast::<Point>().unwrap();
    assert_eq!(*point.borrow(), Point { x: 8, y: 9 });
    assert!(object.downcast::<Node>().is_none());
    assert_eq!(weft.serialize(&value).unwrap(), bytes);

    let list = vec![Value::Int(1), Value::String("two".to_string()), Value::Null];
    let bytes = weft.serialize(&Value::List(list.clone())).unwrap();
    assert_eq!(weft.deserialize::<Value>(&bytes).unwrap(), Value::List(list));
}

#[test]
fn test_dynamic_values_keep_aliasing() {
    let weft = point_weft();
    let shared = Node::named("twice");
    let bytes = weft.serialize(&vec![shared.clone(), shared]).unwrap();
    let value = weft.deserialize_value(&bytes).unwrap();
    let elements = match &value {
        Value::List(elements) => elements,
        other => panic!("expected a list, found {}", other.kind()),
    };
    let first = elements[0].as_object().unwrap();
    assert!(first.ptr_eq(elements[1].as_object().unwrap()));
    assert_eq!(weft.serialize(&value).unwrap(), bytes);
}
