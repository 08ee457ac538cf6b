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

use crate::error::Error;
use crate::serializer::bool::BoolCodec;
use crate::serializer::map::MapCodec;
use crate::serializer::number::{F64Codec, I32Codec, I64Codec};
use crate::serializer::string::StringCodec;
use crate::serializer::Codec;
use crate::types::{BOOL, FLOAT64, HASH_MAP, INT32, INT64, LINKED_MAP, STRING};
use crate::value::{MapKind, MapObject, Object, Value};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Constructs an empty instance of the class with the given type id.
pub type InstanceFactory = fn(u32) -> Value;

pub fn new_hash_map_instance(type_id: u32) -> Value {
    Value::Map(MapObject::new(type_id, MapKind::Hash))
}

pub fn new_linked_map_instance(type_id: u32) -> Value {
    Value::Map(MapObject::new(type_id, MapKind::Linked))
}

pub fn new_object_instance(type_id: u32) -> Value {
    Value::Object(Object::new(type_id))
}

pub fn map_instance_factory(kind: MapKind) -> InstanceFactory {
    match kind {
        MapKind::Hash => new_hash_map_instance,
        MapKind::Linked => new_linked_map_instance,
    }
}

#[derive(Clone)]
pub struct TypeInfo {
    type_id: u32,
    name: String,
    sealed: bool,
    codec: Arc<dyn Codec>,
    factory: Option<InstanceFactory>,
}

impl TypeInfo {
    pub fn new(
        type_id: u32,
        name: impl Into<String>,
        sealed: bool,
        codec: Arc<dyn Codec>,
        factory: Option<InstanceFactory>,
    ) -> TypeInfo {
        TypeInfo {
            type_id,
            name: name.into(),
            sealed,
            codec,
            factory,
        }
    }

    #[inline(always)]
    pub fn get_type_id(&self) -> u32 {
        self.type_id
    }

    #[inline(always)]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Whether no other class can stand in for this one at runtime.
    #[inline(always)]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[inline(always)]
    pub fn get_codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("sealed", &self.sealed)
            .field("constructible", &self.factory.is_some())
            .finish()
    }
}

/// Registry of every class the engine can write, read and copy.
///
/// Polymorphic writes look a value's class up here to find its codec; a class
/// missing from the registry is an [`Error::UnsupportedType`].
pub struct TypeResolver {
    type_infos: HashMap<u32, TypeInfo>,
}

impl Default for TypeResolver {
    fn default() -> Self {
        let mut resolver = TypeResolver {
            type_infos: HashMap::new(),
        };
        resolver.register_internal_types();
        resolver
    }
}

impl TypeResolver {
    fn register_internal_types(&mut self) {
        let scalars: [(u32, &str, Arc<dyn Codec>); 5] = [
            (BOOL, "bool", Arc::new(BoolCodec)),
            (INT32, "i32", Arc::new(I32Codec)),
            (INT64, "i64", Arc::new(I64Codec)),
            (FLOAT64, "f64", Arc::new(F64Codec)),
            (STRING, "String", Arc::new(StringCodec)),
        ];
        for (type_id, name, codec) in scalars {
            self.type_infos
                .insert(type_id, TypeInfo::new(type_id, name, true, codec, None));
        }
        // Map classes stay extensible: a user map class may stand in for them.
        self.type_infos.insert(
            HASH_MAP,
            TypeInfo::new(
                HASH_MAP,
                "HashMap",
                false,
                Arc::new(MapCodec::default()),
                Some(new_hash_map_instance),
            ),
        );
        self.type_infos.insert(
            LINKED_MAP,
            TypeInfo::new(
                LINKED_MAP,
                "LinkedMap",
                false,
                Arc::new(MapCodec::default()),
                Some(new_linked_map_instance),
            ),
        );
    }

    pub fn register(&mut self, type_info: TypeInfo) -> Result<(), Error> {
        let type_id = type_info.get_type_id();
        if let Some(existing) = self.type_infos.get(&type_id) {
            return Err(Error::not_allowed(format!(
                "type id {} is already registered as {}",
                type_id,
                existing.get_name()
            )));
        }
        debug!(
            "registered type {} as {} (sealed: {})",
            type_id,
            type_info.get_name(),
            type_info.is_sealed()
        );
        self.type_infos.insert(type_id, type_info);
        Ok(())
    }

    pub fn get_type_info(&self, type_id: u32) -> Result<&TypeInfo, Error> {
        self.type_infos.get(&type_id).ok_or_else(|| {
            Error::unsupported_type(format!("no codec registered for type id {}", type_id))
        })
    }

    pub fn get_codec(&self, type_id: u32) -> Result<&Arc<dyn Codec>, Error> {
        Ok(self.get_type_info(type_id)?.get_codec())
    }

    /// Whether the class is registered and sealed. Unknown classes are treated as extensible.
    pub fn is_sealed(&self, type_id: u32) -> bool {
        self.type_infos
            .get(&type_id)
            .is_some_and(TypeInfo::is_sealed)
    }

    /// Constructs an empty instance of a container class.
    pub fn new_instance(&self, type_id: u32) -> Result<Value, Error> {
        let type_info = self.get_type_info(type_id)?;
        match type_info.factory {
            Some(factory) => Ok(factory(type_id)),
            None => Err(Error::not_allowed(format!(
                "type {} ({}) has no construction path",
                type_id,
                type_info.get_name()
            ))),
        }
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.type_infos.contains_key(&type_id)
    }
}
