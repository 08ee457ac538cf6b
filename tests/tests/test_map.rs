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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessel_core::error::{should_panic_on_error, Error};
use tessel_core::serializer::map::MapCodec;
use tessel_core::tessel::Tessel;
use tessel_core::types::{HASH_MAP, INT32, INT64, STRING};
use tessel_core::value::{MapKind, MapObject, Object, Value};

fn round_trip(tessel: &Tessel, value: &Value) -> Value {
    let bytes = tessel.serialize(value).unwrap();
    tessel.deserialize(&bytes).expect("deserialize")
}

#[test]
fn test_hashmap_string() {
    let tessel = Tessel::default();
    let map = MapObject::from_pairs([("key1", "value1"), ("key2", "value2")]);
    let value = Value::from(map);
    let obj = round_trip(&tessel, &value);
    assert!(obj.content_eq(&value));
    assert!(!obj.ptr_eq(&value));
}

#[test]
fn test_linked_map_keeps_order() {
    let tessel = Tessel::default();
    let map = MapObject::linked_map();
    for key in ["zeta", "alpha", "mid", "beta"] {
        map.insert(key, key.len() as i32);
    }
    let obj = round_trip(&tessel, &Value::from(map.clone()));
    let obj = obj.as_map().unwrap();
    assert_eq!(obj.kind(), MapKind::Linked);
    let keys: Vec<Value> = obj.entries().iter().map(|(k, _)| k.clone()).collect();
    let expected: Vec<Value> = map.entries().iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_mixed_keys_and_null_values() {
    let tessel = Tessel::default();
    let map = MapObject::hash_map();
    map.insert(1, "int key");
    map.insert(2i64, true);
    map.insert("string key", 1.5);
    map.insert(Value::Null, "null key");
    map.insert(false, Value::Null);
    let value = Value::from(map);
    assert!(round_trip(&tessel, &value).content_eq(&value));
}

#[test]
fn test_nested_maps() {
    let tessel = Tessel::default();
    let inner = MapObject::from_pairs([("x", 1), ("y", 2)]);
    let outer = MapObject::linked_map();
    outer.insert("inner", inner);
    outer.insert("empty", MapObject::hash_map());
    let value = Value::from(outer);
    assert!(round_trip(&tessel, &value).content_eq(&value));
}

#[test]
fn test_every_binding_combination() {
    let mut tessel = Tessel::default();
    let mut type_id = 64;
    for key_bound in [false, true] {
        for value_bound in [false, true] {
            for keys_nullable in [false, true] {
                for values_nullable in [false, true] {
                    let mut codec = MapCodec::default()
                        .keys_nullable(keys_nullable)
                        .values_nullable(values_nullable);
                    if key_bound {
                        codec = codec.key_class(INT32, tessel.codec_for(INT32).unwrap());
                    }
                    if value_bound {
                        codec = codec.value_class(STRING, tessel.codec_for(STRING).unwrap());
                    }
                    tessel
                        .register_map(type_id, "Combination", MapKind::Hash, codec)
                        .unwrap();

                    let map = MapObject::new(type_id, MapKind::Hash);
                    map.insert(1, "one");
                    map.insert(-2, "two");
                    if !key_bound || keys_nullable {
                        map.insert(Value::Null, "null key");
                    }
                    if !value_bound || values_nullable {
                        map.insert(3, Value::Null);
                    }
                    let value = Value::from(map);
                    let obj = round_trip(&tessel, &value);
                    assert!(
                        obj.content_eq(&value),
                        "key bound {}, value bound {}, keys nullable {}, values nullable {}",
                        key_bound,
                        value_bound,
                        keys_nullable,
                        values_nullable
                    );
                    assert_eq!(obj.as_map().unwrap().type_id(), type_id);
                    type_id += 1;
                }
            }
        }
    }
}

#[test]
fn test_compactness_ordering() {
    let mut tessel = Tessel::default();
    let int32 = tessel.codec_for(INT32).unwrap();
    let string = tessel.codec_for(STRING).unwrap();
    let both = MapCodec::default()
        .key_class(STRING, string.clone())
        .value_class(INT32, int32)
        .keys_nullable(false)
        .values_nullable(false);
    let key_only = MapCodec::default()
        .key_class(STRING, string)
        .keys_nullable(false);
    tessel.register_map(64, "Both", MapKind::Linked, both).unwrap();
    tessel.register_map(65, "KeyOnly", MapKind::Linked, key_only).unwrap();
    tessel
        .register_map(66, "Neither", MapKind::Linked, MapCodec::default())
        .unwrap();

    let mut sizes = vec![];
    for type_id in [64, 65, 66] {
        let map = MapObject::new(type_id, MapKind::Linked);
        for i in 0..10 {
            map.insert(format!("k{}", i), i);
        }
        sizes.push(tessel.serialize(&Value::from(map)).unwrap().len());
    }
    assert!(sizes[0] <= sizes[1], "{:?}", sizes);
    assert!(sizes[1] <= sizes[2], "{:?}", sizes);
    // a ref flag and a type id per key
    assert_eq!(sizes[2] - sizes[1], 10 * 2);
}

#[test]
fn test_empty_map_is_minimal() {
    let tessel = Tessel::default();
    let bytes = tessel.serialize(&Value::from(MapObject::hash_map())).unwrap();
    // header, ref flag, type id, size
    assert_eq!(bytes, vec![2, 0, HASH_MAP as u8, 0]);
    let obj = tessel.deserialize(&bytes).unwrap();
    assert!(obj.as_map().unwrap().is_empty());
}

#[test]
fn test_null_on_non_nullable_values_fails_before_writing() {
    if should_panic_on_error() {
        return;
    }
    let mut tessel = Tessel::default();
    let codec = MapCodec::default()
        .value_class(INT32, tessel.codec_for(INT32).unwrap())
        .values_nullable(false);
    tessel.register_map(64, "Strict", MapKind::Hash, codec).unwrap();
    let map = MapObject::new(64, MapKind::Hash);
    map.insert("a", Value::Null);
    let err = tessel.serialize(&Value::from(map)).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)), "{:?}", err);
}

#[test]
fn test_null_on_non_nullable_keys() {
    if should_panic_on_error() {
        return;
    }
    let mut tessel = Tessel::default();
    let codec = MapCodec::default()
        .key_class(STRING, tessel.codec_for(STRING).unwrap())
        .keys_nullable(false);
    tessel.register_map(64, "StrictKeys", MapKind::Hash, codec).unwrap();
    let map = MapObject::new(64, MapKind::Hash);
    map.insert("a", 1);
    map.insert(Value::Null, 2);
    let err = tessel.serialize(&Value::from(map)).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)), "{:?}", err);
}

#[test]
fn test_sealed_generic_hint_elides_tags() {
    let mut tessel = Tessel::default();
    tessel.register_struct(70, "Point", true).unwrap();
    tessel.register_struct(71, "Shape", false).unwrap();
    tessel
        .register_map(64, "Plain", MapKind::Linked, MapCodec::default())
        .unwrap();
    tessel
        .register_map(
            65,
            "SealedHint",
            MapKind::Linked,
            MapCodec::default().generics(Some(STRING), Some(70)),
        )
        .unwrap();
    tessel
        .register_map(
            66,
            "OpenHint",
            MapKind::Linked,
            MapCodec::default().generics(None, Some(71)),
        )
        .unwrap();

    let build = |type_id: u32, point_id: u32| {
        let map = MapObject::new(type_id, MapKind::Linked);
        for i in 0..4 {
            let point = Object::with_fields(point_id, vec![Value::from(i), Value::from(-i)]);
            map.insert(format!("p{}", i), point);
        }
        Value::from(map)
    };

    let plain = build(64, 70);
    let hinted = build(65, 70);
    let open = build(66, 71);
    let plain_bytes = tessel.serialize(&plain).unwrap();
    let hinted_bytes = tessel.serialize(&hinted).unwrap();
    let open_bytes = tessel.serialize(&open).unwrap();
    assert!(hinted_bytes.len() < plain_bytes.len());
    // an extensible hint leaves every element tagged
    assert_eq!(open_bytes.len(), plain_bytes.len());
    assert!(tessel.deserialize(&hinted_bytes).unwrap().content_eq(&hinted));
    assert!(tessel.deserialize(&open_bytes).unwrap().content_eq(&open));
}

#[test]
fn test_hinted_class_mismatch() {
    if should_panic_on_error() {
        return;
    }
    let mut tessel = Tessel::default();
    tessel
        .register_map(
            64,
            "Counts",
            MapKind::Hash,
            MapCodec::default().generics(None, Some(INT64)),
        )
        .unwrap();
    let map = MapObject::new(64, MapKind::Hash);
    map.insert("a", 1i32);
    let err = tessel.serialize(&Value::from(map)).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(INT64, INT32)), "{:?}", err);
}

#[test]
fn test_implausible_size() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    // header, not-null value flag, HASH_MAP, size i32::MAX, nothing else
    let bytes = [2, 0xff, HASH_MAP as u8, 0xff, 0xff, 0xff, 0xff, 0x07];
    let err = tessel.deserialize(&bytes).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "{:?}", err);

    let tessel = Tessel::default().max_collection_size(2);
    let map = MapObject::from_pairs([(1, 1), (2, 2), (3, 3)]);
    let bytes = tessel.serialize(&Value::from(map)).unwrap();
    let err = tessel.deserialize(&bytes).unwrap_err();
    assert!(err.is_format_error(), "{:?}", err);
}

#[test]
fn test_truncated_input() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    let map = MapObject::from_pairs([("key", "value"), ("other", "entry")]);
    let bytes = tessel.serialize(&Value::from(map)).unwrap();
    for len in 1..bytes.len() {
        let err = tessel.deserialize(&bytes[..len]).unwrap_err();
        assert!(err.is_format_error(), "prefix {}: {:?}", len, err);
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    let mut bytes = tessel.serialize(&Value::from(MapObject::hash_map())).unwrap();
    bytes.push(0);
    assert!(tessel.deserialize(&bytes).unwrap_err().is_format_error());
}

#[test]
fn test_unsupported_types() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    let map = MapObject::hash_map();
    map.insert("unknown", Object::new(99));
    let err = tessel.serialize(&Value::from(map)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)), "{:?}", err);

    // one entry whose key is tagged with an unregistered type id
    let bytes = [2, 0xff, HASH_MAP as u8, 1, 0xff, 99, 0];
    let err = tessel.deserialize(&bytes).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)), "{:?}", err);
}

#[test]
fn test_random_maps() {
    let mut rng = StdRng::seed_from_u64(7);
    let tessel = Tessel::default();
    for _ in 0..50 {
        let map = MapObject::hash_map();
        let len = rng.gen_range(0..64);
        for _ in 0..len {
            let key: i32 = rng.gen();
            let value: Value = match rng.gen_range(0..4) {
                0 => Value::Null,
                1 => Value::from(rng.gen::<i64>()),
                2 => Value::from(rng.gen::<f64>()),
                _ => Value::from(format!("{:x}", rng.gen::<u32>())),
            };
            map.insert(key, value);
        }
        let value = Value::from(map);
        assert!(round_trip(&tessel, &value).content_eq(&value));
    }
}
