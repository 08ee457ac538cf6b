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

use crate::buffer::Reader;
use crate::config::Config;
use crate::ensure;
use crate::error::Error;
use crate::resolver::context::{CopyContext, ReadContext, WriteContext};
use crate::resolver::type_resolver::{
    map_instance_factory, new_object_instance, InstanceFactory, TypeInfo, TypeResolver,
};
use crate::serializer::map::MapCodec;
use crate::serializer::struct_::StructCodec;
use crate::serializer::Codec;
use crate::types::config_flags::{IS_LITTLE_ENDIAN_FLAG, IS_NULL_FLAG};
use crate::types::MIN_USER_TYPE_ID;
use crate::value::{MapKind, Value};
use log::debug;
use std::sync::Arc;

/// The serialization engine: a type registry plus the engine-wide [`Config`].
///
/// `Tessel` writes and reads whole object graphs of [`Value`]s. Maps and
/// records are identity tracked, so shared and circular references survive a
/// round trip and a deep copy.
///
/// # Examples
///
/// ```rust
/// use tessel_core::tessel::Tessel;
/// use tessel_core::value::{MapObject, Value};
///
/// let tessel = Tessel::default();
/// let map = MapObject::from_pairs([("a", 1), ("b", 2)]);
/// let bytes = tessel.serialize(&Value::from(map.clone())).unwrap();
/// let decoded = tessel.deserialize(&bytes).unwrap();
/// assert!(decoded.content_eq(&Value::from(map)));
/// ```
///
/// Custom configuration:
///
/// ```rust
/// use tessel_core::tessel::Tessel;
///
/// let tessel = Tessel::default()
///     .track_ref(false)
///     .max_dyn_depth(16)
///     .max_collection_size(1 << 20);
/// assert!(!tessel.get_config().is_track_ref());
/// ```
pub struct Tessel {
    config: Config,
    type_resolver: TypeResolver,
}

impl Default for Tessel {
    fn default() -> Self {
        debug!("creating engine with default configuration");
        Tessel {
            config: Config::default(),
            type_resolver: TypeResolver::default(),
        }
    }
}

impl Tessel {
    /// Enables or disables reference tracking.
    ///
    /// When disabled, a map reachable twice is written twice and read back as
    /// two instances, and a cycle fails with [`Error::DepthExceed`].
    pub fn track_ref(mut self, track_ref: bool) -> Self {
        self.config.track_ref = track_ref;
        self
    }

    /// Sets the maximum nesting depth of maps and records.
    pub fn max_dyn_depth(mut self, max_dyn_depth: u32) -> Self {
        self.config.max_dyn_depth = max_dyn_depth;
        self
    }

    /// Sets the largest map or record size accepted on read.
    pub fn max_collection_size(mut self, max_collection_size: u32) -> Self {
        self.config.max_collection_size = max_collection_size;
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    /// Registers a map class whose instances are written by `codec`.
    ///
    /// ```rust
    /// use tessel_core::serializer::map::MapCodec;
    /// use tessel_core::tessel::Tessel;
    /// use tessel_core::types::STRING;
    /// use tessel_core::value::MapKind;
    ///
    /// let mut tessel = Tessel::default();
    /// let codec = MapCodec::default().key_class(STRING, tessel.codec_for(STRING).unwrap());
    /// tessel.register_map(100, "Labels", MapKind::Linked, codec).unwrap();
    /// ```
    pub fn register_map(
        &mut self,
        type_id: u32,
        name: &str,
        kind: MapKind,
        codec: MapCodec,
    ) -> Result<(), Error> {
        self.register_codec(
            type_id,
            name,
            false,
            Arc::new(codec),
            Some(map_instance_factory(kind)),
        )
    }

    /// Registers a record class. A sealed class may be used as a generic hint.
    pub fn register_struct(&mut self, type_id: u32, name: &str, sealed: bool) -> Result<(), Error> {
        self.register_codec(
            type_id,
            name,
            sealed,
            Arc::new(StructCodec),
            Some(new_object_instance),
        )
    }

    /// Registers a class with an arbitrary codec.
    pub fn register_codec(
        &mut self,
        type_id: u32,
        name: &str,
        sealed: bool,
        codec: Arc<dyn Codec>,
        factory: Option<InstanceFactory>,
    ) -> Result<(), Error> {
        ensure!(
            type_id >= MIN_USER_TYPE_ID,
            Error::not_allowed(format!(
                "type id {} is reserved for built-in classes, user ids start at {}",
                type_id, MIN_USER_TYPE_ID
            ))
        );
        self.type_resolver
            .register(TypeInfo::new(type_id, name, sealed, codec, factory))
    }

    /// Codec registered for `type_id`, for building class bindings.
    pub fn codec_for(&self, type_id: u32) -> Result<Arc<dyn Codec>, Error> {
        Ok(self.type_resolver.get_codec(type_id)?.clone())
    }

    fn write_head(&self, is_null: bool, context: &mut WriteContext) {
        let mut bitmap = IS_LITTLE_ENDIAN_FLAG;
        if is_null {
            bitmap |= IS_NULL_FLAG;
        }
        context.writer.write_u8(bitmap);
    }

    fn read_head(&self, reader: &mut Reader) -> Result<bool, Error> {
        let bitmap = reader.read_u8()?;
        ensure!(
            bitmap & !(IS_NULL_FLAG | IS_LITTLE_ENDIAN_FLAG) == 0,
            Error::invalid_data(format!("unknown header bits in {:#04x}", bitmap))
        );
        ensure!(
            bitmap & IS_LITTLE_ENDIAN_FLAG != 0,
            Error::invalid_data("big endian input is not supported")
        );
        Ok(bitmap & IS_NULL_FLAG != 0)
    }

    /// Serializes a value graph into a byte vector.
    ///
    /// On error nothing is returned; a partially written stream never escapes.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>, Error> {
        let mut context = WriteContext::new(&self.type_resolver, &self.config);
        self.serialize_with_context(value, &mut context)?;
        Ok(context.writer.into_bytes())
    }

    pub fn serialize_with_context(
        &self,
        value: &Value,
        context: &mut WriteContext,
    ) -> Result<(), Error> {
        self.write_head(value.is_null(), context);
        if value.is_null() {
            return Ok(());
        }
        context.write_tagged(value)
    }

    /// Deserializes a value graph. Trailing bytes after the root are an error.
    ///
    /// Cycles in the input become `Rc` cycles in the result. They stay alive
    /// until the caller breaks them, e.g. with [`MapObject::clear`](crate::value::MapObject::clear).
    pub fn deserialize(&self, bf: &[u8]) -> Result<Value, Error> {
        let mut context = ReadContext::new(&self.type_resolver, &self.config, Reader::new(bf));
        let value = self.deserialize_with_context(&mut context)?;
        ensure!(
            context.reader.remaining() == 0,
            Error::invalid_data(format!(
                "{} trailing bytes after the root value",
                context.reader.remaining()
            ))
        );
        Ok(value)
    }

    pub fn deserialize_with_context(&self, context: &mut ReadContext) -> Result<Value, Error> {
        if self.read_head(&mut context.reader)? {
            return Ok(Value::Null);
        }
        context.read_tagged()
    }

    /// Deep-copies a value graph.
    ///
    /// The result shares no map or record with `value`. Shared sub-graphs are
    /// copied once and cycles are preserved, independent of `track_ref`.
    /// As with [`Tessel::deserialize`], a cyclic copy must be broken by the
    /// caller to be freed.
    pub fn deep_copy(&self, value: &Value) -> Result<Value, Error> {
        let mut context = CopyContext::new(&self.type_resolver, &self.config);
        context.copy(value)
    }
}
