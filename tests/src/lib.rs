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

//! Models shared by the integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use weft::{AsAny, Error, Locator, Referencable, Weft};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Weft, Default, Debug, Clone, PartialEq)]
pub struct Point {
    #[weft(tag = 1)]
    pub x: i32,
    #[weft(tag = 2)]
    pub y: i32,
}

#[derive(Weft, Default, Debug)]
pub struct Node {
    #[weft(tag = 1)]
    pub name: String,
    #[weft(tag = 2)]
    pub next: Option<Rc<RefCell<Node>>>,
}

impl Node {
    pub fn named(name: &str) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(Node {
            name: name.to_string(),
            next: None,
        }))
    }
}

#[derive(Weft, Default)]
pub struct TreeNode {
    #[weft(tag = 1)]
    pub label: String,
    #[weft(tag = 2)]
    pub parent: Weak<RefCell<TreeNode>>,
    #[weft(tag = 3)]
    pub children: Vec<Rc<RefCell<TreeNode>>>,
}

pub trait Shape: AsAny {
    fn area(&self) -> f64;
}

weft::polymorphic!(Shape);

#[derive(Weft, Default, Debug, PartialEq)]
pub struct Circle {
    #[weft(tag = 1)]
    pub radius: f64,
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[derive(Weft, Default, Debug, PartialEq)]
pub struct Square {
    #[weft(tag = 1)]
    pub side: f64,
}

impl Shape for Square {
    fn area(&self) -> f64 {
        self.side * self.side
    }
}

/// Registered but never declared a subtype of `Shape`.
#[derive(Weft, Default, Debug)]
pub struct Label {
    #[weft(tag = 1)]
    pub text: String,
}

impl Shape for Label {
    fn area(&self) -> f64 {
        0.0
    }
}

#[derive(Weft, Default)]
pub struct Drawing {
    #[weft(tag = 1)]
    pub shapes: Vec<Rc<RefCell<dyn Shape>>>,
}

impl std::fmt::Debug for Drawing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drawing")
            .field("shapes", &self.shapes.len())
            .finish()
    }
}

pub fn circle_as_shape(circle: Rc<RefCell<Circle>>) -> Rc<RefCell<dyn Shape>> {
    circle
}

pub fn square_as_shape(square: Rc<RefCell<Square>>) -> Rc<RefCell<dyn Shape>> {
    square
}

/// Shapes are registered with subtypes `Circle` and `Square`; `Label` is only
/// registered.
pub fn shapes_weft() -> Result<Weft, Error> {
    let mut weft = Weft::default();
    weft.register_abstract::<dyn Shape>(300)?;
    weft.register::<Circle>(301)?;
    weft.register::<Square>(302)?;
    weft.register::<Label>(303)?;
    weft.register::<Drawing>(304)?;
    weft.register_subtype::<dyn Shape, Circle>(circle_as_shape)?;
    weft.register_subtype::<dyn Shape, Square>(square_as_shape)?;
    Ok(weft)
}

#[derive(Weft, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Red,
    Green,
    Blue,
}

#[derive(Weft, Debug)]
#[weft(catalog = "CURRENCIES")]
pub struct Currency {
    #[weft(key)]
    pub number: i32,
    pub code: &'static str,
}

pub static CURRENCIES: [Currency; 3] = [
    Currency {
        number: 978,
        code: "EUR",
    },
    Currency {
        number: 840,
        code: "USD",
    },
    Currency {
        number: 392,
        code: "JPY",
    },
];

#[derive(Weft, Default, Debug)]
pub struct Invoice {
    #[weft(tag = 1)]
    pub amount: i64,
    #[weft(tag = 2)]
    pub currency: Option<&'static Currency>,
}

/// A tile of the live world; never encoded by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub terrain: String,
}

#[derive(Weft, Default, Debug, Clone, PartialEq)]
pub struct TileRef {
    #[weft(tag = 1)]
    pub x: i32,
    #[weft(tag = 2)]
    pub y: i32,
}

#[derive(Default)]
pub struct World {
    pub tiles: HashMap<(i32, i32), Tile>,
}

impl World {
    pub fn add(&mut self, x: i32, y: i32, terrain: &str) {
        self.tiles.insert(
            (x, y),
            Tile {
                x,
                y,
                terrain: terrain.to_string(),
            },
        );
    }
}

impl Locator for TileRef {
    type Target = Tile;
    type State = World;

    fn resolve(&self, world: &World) -> Option<Tile> {
        world.tiles.get(&(self.x, self.y)).cloned()
    }
}

impl Referencable for Tile {
    type Locator = TileRef;

    fn to_locator(&self) -> TileRef {
        TileRef {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Weft, Default, Debug)]
pub struct Move {
    #[weft(tag = 1)]
    pub unit: String,
    #[weft(tag = 2)]
    pub target: weft::Deferred<TileRef>,
}

#[derive(Weft, Debug)]
#[weft(create = "Build::blank")]
pub struct Build {
    #[weft(tag = 1)]
    pub what: String,
    #[weft(tag = 2, as_reference)]
    pub site: Tile,
}

impl Build {
    fn blank(_: &mut weft::Input<'_>) -> Result<Build, Error> {
        Ok(Build {
            what: String::new(),
            site: Tile {
                x: 0,
                y: 0,
                terrain: String::new(),
            },
        })
    }
}

pub fn world_weft() -> Result<Weft, Error> {
    let mut weft = Weft::default();
    weft.register::<TileRef>(400)?;
    weft.register::<Move>(401)?;
    weft.register::<Build>(402)?;
    Ok(weft)
}
