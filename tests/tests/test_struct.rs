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

use tessel_core::error::{should_panic_on_error, Error};
use tessel_core::serializer::map::MapCodec;
use tessel_core::tessel::Tessel;
use tessel_core::types::INT32;
use tessel_core::value::{MapKind, MapObject, Object, Value};

#[test]
fn test_struct_with_maps() {
    let mut tessel = Tessel::default();
    tessel.register_struct(70, "MapContainer", true).unwrap();
    let codec = MapCodec::default().generics(Some(INT32), Some(INT32));
    tessel.register_map(64, "IntMap", MapKind::Linked, codec).unwrap();

    let int_map = MapObject::new(64, MapKind::Linked);
    int_map.insert(1, 10);
    int_map.insert(2, Value::Null);
    let container = Object::with_fields(
        70,
        vec![
            Value::from(MapObject::from_pairs([("foo", "bar")])),
            Value::from(int_map),
            Value::from(42),
        ],
    );
    let value = Value::from(container);
    let bytes = tessel.serialize(&value).unwrap();
    let obj = tessel.deserialize(&bytes).unwrap();
    assert!(obj.content_eq(&value));
    assert_eq!(obj.as_object().unwrap().get(2), Some(Value::from(42)));
}

#[test]
fn test_empty_struct() {
    let mut tessel = Tessel::default();
    tessel.register_struct(70, "Unit", true).unwrap();
    let value = Value::from(Object::new(70));
    let obj = tessel.deserialize(&tessel.serialize(&value).unwrap()).unwrap();
    assert!(obj.as_object().unwrap().is_empty());
}

#[test]
fn test_scalar_classes_cannot_be_instantiated() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    let err = tessel.get_type_resolver().new_instance(INT32).unwrap_err();
    assert!(matches!(err, Error::NotAllowed(_)), "{:?}", err);
    let err = tessel.get_type_resolver().new_instance(70).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)), "{:?}", err);
}
