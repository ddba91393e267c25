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
use std::rc::{Rc, Weak};
use tests::{init_logging, Node, Point, TreeNode};
use weft::{Error, Weft};

fn graph_weft() -> Weft {
    let mut weft = Weft::default();
    weft.register::<Point>(200).unwrap();
    weft.register::<Node>(201).unwrap();
    weft.register::<TreeNode>(202).unwrap();
    weft
}

#[test]
fn test_aliased_handle_is_written_once() {
    init_logging();
    let weft = graph_weft();
    let shared = Node::named("shared");
    let list = vec![shared.clone(), shared.clone()];
    let bytes = weft.serialize(&list).unwrap();
    // the list is reference #0, the node #1
    assert_eq!(&bytes[bytes.len() - 6..], &[0x00, 0x0a, 0x00, 0x00, 0x00, 0x01]);

    let decoded: Vec<Rc<RefCell<Node>>> = weft.deserialize(&bytes).unwrap();
    assert_eq!(decoded.len(), 2);
    assert!(Rc::ptr_eq(&decoded[0], &decoded[1]));
    assert_eq!(decoded[0].borrow().name, "shared");

    decoded[0].borrow_mut().name = "changed".to_string();
    assert_eq!(decoded[1].borrow().name, "changed");
}

#[test]
fn test_distinct_equal_values_stay_distinct() {
    let weft = graph_weft();
    let list = vec![Node::named("a"), Node::named("a")];
    let decoded: Vec<Rc<RefCell<Node>>> = weft.copy(&list).unwrap();
    assert!(!Rc::ptr_eq(&decoded[0], &decoded[1]));
}

#[test]
fn test_cycle_round_trip() {
    let weft = graph_weft();
    let a = Node::named("a");
    let b = Node::named("b");
    a.borrow_mut().next = Some(b.clone());
    b.borrow_mut().next = Some(a.clone());

    let bytes = weft.serialize(&a).unwrap();
    b.borrow_mut().next = None;

    let decoded: Rc<RefCell<Node>> = weft.deserialize(&bytes).unwrap();
    let second = decoded.borrow().next.clone().unwrap();
    assert_eq!(second.borrow().name, "b");
    let back = second.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&back, &decoded));
    second.borrow_mut().next = None;
}

#[test]
fn test_self_cycle() {
    let weft = graph_weft();
    let node = Node::named("loop");
    node.borrow_mut().next = Some(node.clone());
    let decoded: Rc<RefCell<Node>> = weft.copy(&node).unwrap();
    node.borrow_mut().next = None;

    let next = decoded.borrow_mut().next.take().unwrap();
    assert!(Rc::ptr_eq(&next, &decoded));
}

#[test]
fn test_weak_parent_links() {
    let weft = graph_weft();
    let root = Rc::new(RefCell::new(TreeNode {
        label: "root".to_string(),
        ..Default::default()
    }));
    for label in ["left", "right"] {
        let child = Rc::new(RefCell::new(TreeNode {
            label: label.to_string(),
            parent: Rc::downgrade(&root),
            children: Vec::new(),
        }));
        root.borrow_mut().children.push(child);
    }

    let decoded: Rc<RefCell<TreeNode>> = weft.copy(&root).unwrap();
    let decoded_root = decoded.borrow();
    assert_eq!(decoded_root.label, "root");
    assert!(decoded_root.parent.upgrade().is_none());
    let labels: Vec<_> = decoded_root
        .children
        .iter()
        .map(|child| child.borrow().label.clone())
        .collect();
    assert_eq!(labels, ["left", "right"]);
    for child in &decoded_root.children {
        let parent = child.borrow().parent.upgrade().unwrap();
        assert!(Rc::ptr_eq(&parent, &decoded));
    }
}

#[test]
fn test_dead_weak_is_null() {
    let weft = graph_weft();
    let orphan = TreeNode {
        label: "orphan".to_string(),
        parent: Weak::new(),
        children: Vec::new(),
    };
    let decoded: TreeNode = weft.copy(&orphan).unwrap();
    assert!(decoded.parent.upgrade().is_none());
}

#[test]
fn test_immutable_rc_aliasing() {
    let weft = graph_weft();
    let point = Rc::new(Point { x: 1, y: 2 });
    let other = Rc::new(Point { x: 1, y: 2 });
    let list = vec![point.clone(), other, point];
    let decoded: Vec<Rc<Point>> = weft.copy(&list).unwrap();
    assert!(Rc::ptr_eq(&decoded[0], &decoded[2]));
    assert!(!Rc::ptr_eq(&decoded[0], &decoded[1]));
    assert_eq!(*decoded[1], Point { x: 1, y: 2 });
}

#[test]
fn test_nested_handles_keep_aliasing() {
    let weft = graph_weft();
    let inner = Node::named("n");
    let outer = Rc::new(inner.clone());
    let list = vec![outer.clone(), outer];
    let bytes = weft.serialize(&list).unwrap();
    assert_eq!(&bytes[bytes.len() - 6..], &[0x00, 0x0a, 0, 0, 0, 1]);
    let decoded: Vec<Rc<Rc<RefCell<Node>>>> = weft.deserialize(&bytes).unwrap();
    assert!(Rc::ptr_eq(&decoded[0], &decoded[1]));
    assert_eq!(decoded[0].borrow().name, "n");

    // the outer handle first appears as a reference to the inner one
    let pair = (inner.clone(), Rc::new(inner));
    let (first, second): (Rc<RefCell<Node>>, Rc<Rc<RefCell<Node>>>) = weft.copy(&pair).unwrap();
    assert!(Rc::ptr_eq(&first, &*second));

    let err = weft
        .deserialize::<(Rc<RefCell<Node>>, Rc<Point>)>(&weft.serialize(&pair).unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(_)), "{err}");
}

#[test]
fn test_value_objects_are_not_tracked() {
    let weft = graph_weft();
    let list = vec![Point { x: 5, y: 5 }, Point { x: 5, y: 5 }];
    let bytes = weft.serialize(&list).unwrap();
    assert!(!bytes.windows(2).any(|w| w == [0x00, 0x0a]));
    let decoded: Vec<Point> = weft.deserialize(&bytes).unwrap();
    assert_eq!(decoded, list);
}

#[test]
fn test_reference_to_unknown_id() {
    let weft = graph_weft();
    let bytes = [0x00, 0x0c, 0x00, 0x01, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x05];
    let err = weft
        .deserialize::<Vec<Rc<RefCell<Node>>>>(&bytes)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{err}");
}

#[test]
fn test_reference_to_plain_value() {
    let weft = graph_weft();
    // a list (#0) holding a Point (#1) then a reference to #1
    let mut bytes = vec![0x00, 0x0c, 0x00, 0x02];
    bytes.extend(weft.serialize(&Point { x: 0, y: 0 }).unwrap());
    bytes.extend([0x00, 0x0a, 0x00, 0x00, 0x00, 0x01]);
    let err = weft.deserialize::<Vec<Point>>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{err}");
}

#[test]
fn test_borrowed_handle_cannot_be_written() {
    let weft = graph_weft();
    let node = Node::named("busy");
    let _guard = node.borrow_mut();
    let err = weft.serialize(&node).unwrap_err();
    assert!(err.is_write_error(), "{err}");
}
