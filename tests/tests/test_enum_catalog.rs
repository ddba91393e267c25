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

use tests::{init_logging, Color, Currency, Invoice, CURRENCIES};
use weft::{Enumeration, Error, TypeKind, Weft};

fn catalog_weft() -> Weft {
    let mut weft = Weft::default();
    weft.register::<Color>(30).unwrap();
    weft.register_catalog::<Currency>(Some(31)).unwrap();
    weft.register::<Invoice>(32).unwrap();
    weft
}

#[test]
fn test_enum_variants() {
    init_logging();
    let weft = catalog_weft();
    assert_eq!(Color::variants(), &[Color::Red, Color::Green, Color::Blue]);
    assert_eq!(Color::Blue.ordinal(), 2);
    for color in Color::variants() {
        assert_eq!(weft.copy(color).unwrap(), *color);
    }
    assert_eq!(weft.type_of(30).unwrap().kind(), TypeKind::Enumeration);
}

#[test]
fn test_enum_ordinal_out_of_range() {
    let weft = catalog_weft();
    let bytes = [0x00, 0x1e, 0x00, 0x03, 0x00, 0x00, 0x00, 0x07];
    let err = weft.deserialize::<Color>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

#[test]
fn test_catalog_identity() {
    let weft = catalog_weft();
    let usd: &'static Currency = &CURRENCIES[1];
    let bytes = weft.serialize(&usd).unwrap();
    // the key, 840, as an INT
    assert_eq!(bytes, vec![0x00, 0x1f, 0x00, 0x03, 0x00, 0x00, 0x03, 0x48]);
    let decoded: &'static Currency = weft.deserialize(&bytes).unwrap();
    assert!(std::ptr::eq(decoded, usd));
    assert_eq!(decoded.code, "USD");
    assert_eq!(weft.type_of(31).unwrap().kind(), TypeKind::Catalog);
}

#[test]
fn test_catalog_field() {
    let weft = catalog_weft();
    let invoice = Invoice {
        amount: 1200,
        currency: Some(&CURRENCIES[2]),
    };
    let decoded = weft.copy(&invoice).unwrap();
    assert_eq!(decoded.amount, 1200);
    assert!(std::ptr::eq(decoded.currency.unwrap(), &CURRENCIES[2]));

    let unpriced = weft
        .copy(&Invoice {
            amount: 0,
            currency: None,
        })
        .unwrap();
    assert!(unpriced.currency.is_none());
}

#[test]
fn test_unknown_catalog_key() {
    let weft = catalog_weft();
    let bytes = [0x00, 0x1f, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01];
    let err = weft.deserialize::<&'static Currency>(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{err}");
}

mod duplicate_keys {
    use weft::Weft;

    #[derive(Weft, Debug)]
    #[weft(catalog = "UNITS")]
    pub struct Unit {
        #[weft(key)]
        pub symbol: i32,
    }

    pub static UNITS: [Unit; 2] = [Unit { symbol: 1 }, Unit { symbol: 1 }];

    #[test]
    fn test_duplicate_catalog_key_is_rejected() {
        let mut weft = Weft::default();
        let err = weft.register_catalog::<Unit>(None).unwrap_err();
        assert!(err.is_registration_error(), "{err}");
    }
}
