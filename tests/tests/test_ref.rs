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

use std::rc::Rc;
use std::sync::Arc;
use tessel::{Error, MapCodec, MapKind, MapObject, Object, Tessel, Value};
use tessel_core::error::should_panic_on_error;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn entry(map: &Value, key: &str) -> Value {
    map.as_map().unwrap().get(&Value::from(key)).unwrap()
}

#[test]
fn test_self_referential_map() {
    init_logger();
    let tessel = Tessel::default();
    let map = MapObject::hash_map();
    map.insert("name", "root");
    map.insert("self", map.clone());
    let bytes = tessel.serialize(&Value::from(map.clone())).unwrap();
    let obj = tessel.deserialize(&bytes).unwrap();
    assert!(entry(&obj, "self").ptr_eq(&obj));
    assert_eq!(entry(&obj, "name"), Value::from("root"));
    obj.as_map().unwrap().clear();
    map.clear();
}

#[test]
fn test_self_reference_through_bound_value_side() {
    init_logger();
    let mut tessel = Tessel::default();
    let codec = MapCodec::default().value_class(64, Arc::new(MapCodec::default()));
    tessel.register_map(64, "Node", MapKind::Linked, codec).unwrap();
    let node = MapObject::new(64, MapKind::Linked);
    node.insert("self", node.clone());
    node.insert("nothing", Value::Null);
    let bytes = tessel.serialize(&Value::from(node.clone())).unwrap();
    let obj = tessel.deserialize(&bytes).unwrap();
    assert!(entry(&obj, "self").ptr_eq(&obj));
    assert!(entry(&obj, "nothing").is_null());
    obj.as_map().unwrap().clear();
    node.clear();
}

#[test]
fn test_shared_values_decode_to_one_instance() {
    let tessel = Tessel::default();
    let shared = MapObject::from_pairs([("x", 1)]);
    let outer = MapObject::hash_map();
    outer.insert("a", shared.clone());
    outer.insert("b", shared.clone());
    outer.insert(shared.clone(), "as key");
    let obj = tessel.deserialize(&tessel.serialize(&Value::from(outer)).unwrap()).unwrap();
    let a = entry(&obj, "a");
    let b = entry(&obj, "b");
    assert!(a.ptr_eq(&b));
    assert!(obj.as_map().unwrap().contains_key(&a));
}

#[test]
fn test_cycle_through_struct() {
    let mut tessel = Tessel::default();
    tessel.register_struct(70, "Owner", false).unwrap();
    let owner = Object::new(70);
    let map = MapObject::hash_map();
    map.insert("owner", owner.clone());
    owner.push(map.clone());
    owner.push("name");
    let bytes = tessel.serialize(&Value::from(owner.clone())).unwrap();
    let obj = tessel.deserialize(&bytes).unwrap();
    let inner = obj.as_object().unwrap().get(0).unwrap();
    assert!(entry(&inner, "owner").ptr_eq(&obj));
    assert_eq!(obj.as_object().unwrap().get(1), Some(Value::from("name")));
    inner.as_map().unwrap().clear();
    map.clear();
}

#[test]
fn test_without_ref_tracking() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default().track_ref(false);
    let shared = MapObject::from_pairs([("x", 1)]);
    let outer = MapObject::hash_map();
    outer.insert("a", shared.clone());
    outer.insert("b", shared);
    let value = Value::from(outer);
    let obj = tessel.deserialize(&tessel.serialize(&value).unwrap()).unwrap();
    assert!(obj.content_eq(&value));
    assert!(!entry(&obj, "a").ptr_eq(&entry(&obj, "b")));

    let cyclic = MapObject::hash_map();
    cyclic.insert("self", cyclic.clone());
    let err = tessel.serialize(&Value::from(cyclic.clone())).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{:?}", err);
    cyclic.clear();
}

#[test]
fn test_unknown_reference_id() {
    if should_panic_on_error() {
        return;
    }
    let tessel = Tessel::default();
    // header, ref flag, ref id 5
    let err = tessel.deserialize(&[2, 0xfe, 5]).unwrap_err();
    assert!(matches!(err, Error::InvalidRef(_)), "{:?}", err);
}

#[test]
fn test_max_dyn_depth_exceeded() {
    if should_panic_on_error() {
        return;
    }
    let mut root = MapObject::hash_map();
    for _ in 0..4 {
        let parent = MapObject::hash_map();
        parent.insert("child", root);
        root = parent;
    }
    let value = Value::from(root);

    let limited = Tessel::default().max_dyn_depth(3);
    let err = limited.serialize(&value).unwrap_err();
    assert!(format!("{:?}", err).contains("Maximum dynamic object nesting depth"));

    let bytes = Tessel::default().serialize(&value).unwrap();
    let err = limited.deserialize(&bytes).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{:?}", err);

    let err = limited.deep_copy(&value).unwrap_err();
    assert!(matches!(err, Error::DepthExceed(_)), "{:?}", err);

    let enough = Tessel::default().max_dyn_depth(5);
    assert!(enough.deserialize(&bytes).unwrap().content_eq(&value));
}

#[test]
fn test_clear_releases_decoded_cycle() {
    let tessel = Tessel::default();
    let map = MapObject::hash_map();
    map.insert("self", map.clone());
    let bytes = tessel.serialize(&Value::from(map.clone())).unwrap();
    map.clear();
    assert_eq!(Rc::strong_count(&map), 1);

    let obj = tessel.deserialize(&bytes).unwrap();
    let weak = Rc::downgrade(obj.as_map().unwrap());
    obj.as_map().unwrap().clear();
    drop(obj);
    assert!(weak.upgrade().is_none());

    let obj = tessel.deserialize(&bytes).unwrap();
    let copy = tessel.deep_copy(&obj).unwrap();
    obj.as_map().unwrap().clear();
    let weak = Rc::downgrade(copy.as_map().unwrap());
    copy.as_map().unwrap().clear();
    drop(copy);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_reference_of_wrong_class_on_bound_side() {
    if should_panic_on_error() {
        return;
    }
    let mut tessel = Tessel::default();
    tessel
        .register_map(65, "Leaf", MapKind::Hash, MapCodec::default())
        .unwrap();
    let codec = MapCodec::default().value_class(65, tessel.codec_for(65).unwrap());
    tessel.register_map(64, "Tree", MapKind::Hash, codec).unwrap();
    // root map of class 64 whose single value refers back to the root
    let bytes = [
        2, 0, 64, 1, // header, ref value, type id, size
        0xff, 12, 1, b'a', // tagged key "a"
        1, 0xfe, 0, // present, reference to id 0
    ];
    let err = tessel.deserialize(&bytes).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch(65, 64)), "{:?}", err);
}
