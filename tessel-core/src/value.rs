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

//! Dynamic values of the object graph.
//!
//! Scalars are plain values. Maps and objects are reference types: they are
//! shared through `Rc`, compared and hashed by identity, and mutated through a
//! `RefCell` so a container can be registered before it is populated.

use crate::types::{BOOL, FLOAT64, HASH_MAP, INT32, INT64, LINKED_MAP, STRING};
use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::collections::{hash_map, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

pub type MapRef = Rc<MapObject>;
pub type ObjectRef = Rc<Object>;

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Map(MapRef),
    Object(ObjectRef),
}

impl Value {
    /// Concrete class of the value, `None` for null.
    pub fn type_id(&self) -> Option<u32> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(BOOL),
            Value::I32(_) => Some(INT32),
            Value::I64(_) => Some(INT64),
            Value::F64(_) => Some(FLOAT64),
            Value::String(_) => Some(STRING),
            Value::Map(map) => Some(map.type_id()),
            Value::Object(object) => Some(object.type_id()),
        }
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Address identifying a reference-typed value, `None` for scalars.
    #[inline(always)]
    pub fn ref_addr(&self) -> Option<usize> {
        match self {
            Value::Map(map) => Some(Rc::as_ptr(map) as *const () as usize),
            Value::Object(object) => Some(Rc::as_ptr(object) as *const () as usize),
            _ => None,
        }
    }

    /// Whether both values are the same reference-typed instance.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.ref_addr(), other.ref_addr()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Structural equality that follows maps and objects instead of comparing
    /// their identity. Cycles are detected; a pair already under comparison is
    /// assumed equal.
    pub fn content_eq(&self, other: &Value) -> bool {
        let mut in_progress = HashSet::new();
        content_eq_inner(self, other, &mut in_progress)
    }
}

fn content_eq_inner(a: &Value, b: &Value, in_progress: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Map(x), Value::Map(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let pair = (a.ref_addr().unwrap_or(0), b.ref_addr().unwrap_or(0));
            if !in_progress.insert(pair) {
                return true;
            }
            if x.type_id() != y.type_id() || x.len() != y.len() {
                return false;
            }
            let xe = x.entries();
            let ye = y.entries();
            xe.iter().all(|(k, v)| match ye.get(k) {
                Some(w) => content_eq_inner(v, w, in_progress),
                // reference-typed keys hash by identity, fall back to a scan
                None => ye.iter().any(|(k2, w)| {
                    content_eq_inner(k, k2, in_progress) && content_eq_inner(v, w, in_progress)
                }),
            })
        }
        (Value::Object(x), Value::Object(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let pair = (a.ref_addr().unwrap_or(0), b.ref_addr().unwrap_or(0));
            if !in_progress.insert(pair) {
                return true;
            }
            let xf = x.fields();
            let yf = y.fields();
            x.type_id() == y.type_id()
                && xf.len() == yf.len()
                && xf
                    .iter()
                    .zip(yf.iter())
                    .all(|(v, w)| content_eq_inner(v, w, in_progress))
        }
        _ => a == b,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Map(_) | Value::Object(_) => self.ref_addr().hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<MapRef> for Value {
    fn from(v: MapRef) -> Self {
        Value::Map(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Backing store of a map class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapKind {
    /// Unordered hash map.
    Hash,
    /// Hash map iterating in insertion order.
    Linked,
}

pub enum MapEntries {
    Hash(HashMap<Value, Value>),
    Linked(IndexMap<Value, Value>),
}

pub enum MapIter<'a> {
    Hash(hash_map::Iter<'a, Value, Value>),
    Linked(indexmap::map::Iter<'a, Value, Value>),
}

impl<'a> Iterator for MapIter<'a> {
    type Item = (&'a Value, &'a Value);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MapIter::Hash(iter) => iter.next(),
            MapIter::Linked(iter) => iter.next(),
        }
    }
}

impl MapEntries {
    pub fn len(&self) -> usize {
        match self {
            MapEntries::Hash(map) => map.len(),
            MapEntries::Linked(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            MapEntries::Hash(map) => map.get(key),
            MapEntries::Linked(map) => map.get(key),
        }
    }

    pub fn iter(&self) -> MapIter<'_> {
        match self {
            MapEntries::Hash(map) => MapIter::Hash(map.iter()),
            MapEntries::Linked(map) => MapIter::Linked(map.iter()),
        }
    }
}

/// A live map instance of some registered map class.
///
/// Maps are reference counted. A map that reaches itself, directly or through
/// other maps and records, is never freed on its own; break the cycle with
/// [`MapObject::clear`] once the graph is no longer needed.
pub struct MapObject {
    type_id: u32,
    entries: RefCell<MapEntries>,
}

impl MapObject {
    pub fn new(type_id: u32, kind: MapKind) -> MapRef {
        let entries = match kind {
            MapKind::Hash => MapEntries::Hash(HashMap::new()),
            MapKind::Linked => MapEntries::Linked(IndexMap::new()),
        };
        Rc::new(MapObject {
            type_id,
            entries: RefCell::new(entries),
        })
    }

    /// New empty instance of the built-in `HASH_MAP` class.
    pub fn hash_map() -> MapRef {
        Self::new(HASH_MAP, MapKind::Hash)
    }

    /// New empty instance of the built-in `LINKED_MAP` class.
    pub fn linked_map() -> MapRef {
        Self::new(LINKED_MAP, MapKind::Linked)
    }

    /// Builds a `HASH_MAP` from key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> MapRef
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = Self::hash_map();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    #[inline(always)]
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn kind(&self) -> MapKind {
        match &*self.entries.borrow() {
            MapEntries::Hash(_) => MapKind::Hash,
            MapEntries::Linked(_) => MapKind::Linked,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reserve(&self, additional: usize) {
        match &mut *self.entries.borrow_mut() {
            MapEntries::Hash(map) => map.reserve(additional),
            MapEntries::Linked(map) => map.reserve(additional),
        }
    }

    pub fn insert(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let (key, value) = (key.into(), value.into());
        match &mut *self.entries.borrow_mut() {
            MapEntries::Hash(map) => map.insert(key, value),
            MapEntries::Linked(map) => map.insert(key, value),
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.borrow().get(key).is_some()
    }

    pub fn remove(&self, key: &Value) -> Option<Value> {
        match &mut *self.entries.borrow_mut() {
            MapEntries::Hash(map) => map.remove(key),
            MapEntries::Linked(map) => map.shift_remove(key),
        }
    }

    pub fn clear(&self) {
        match &mut *self.entries.borrow_mut() {
            MapEntries::Hash(map) => map.clear(),
            MapEntries::Linked(map) => map.clear(),
        }
    }

    /// Borrows the entries. Do not insert into this map while the guard is alive.
    pub fn entries(&self) -> Ref<'_, MapEntries> {
        self.entries.borrow()
    }
}

// Maps may contain themselves, so Debug never descends into entries.
impl fmt::Debug for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapObject")
            .field("type_id", &self.type_id)
            .field("len", &self.len())
            .finish()
    }
}

/// A live instance of a registered record class: a class id and its field values.
pub struct Object {
    type_id: u32,
    fields: RefCell<Vec<Value>>,
}

impl Object {
    pub fn new(type_id: u32) -> ObjectRef {
        Self::with_fields(type_id, Vec::new())
    }

    pub fn with_fields(type_id: u32, fields: Vec<Value>) -> ObjectRef {
        Rc::new(Object {
            type_id,
            fields: RefCell::new(fields),
        })
    }

    #[inline(always)]
    pub fn type_id(&self) -> u32 {
        self.type_id
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.fields.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: impl Into<Value>) {
        let mut fields = self.fields.borrow_mut();
        if index >= fields.len() {
            fields.resize(index + 1, Value::Null);
        }
        fields[index] = value.into();
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.fields.borrow_mut().push(value.into());
    }

    pub fn fields(&self) -> Ref<'_, Vec<Value>> {
        self.fields.borrow()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_id", &self.type_id)
            .field("len", &self.len())
            .finish()
    }
}
