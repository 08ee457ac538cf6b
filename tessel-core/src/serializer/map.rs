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

//! Codec for associative containers.
//!
//! Record layout: `[size varuint32][key value]*size`. Each side of an entry is
//! shaped by its binding:
//!
//! | binding               | bytes                                         |
//! |-----------------------|-----------------------------------------------|
//! | bound, nullable       | `[presence u8][payload if presence == 1]`     |
//! | bound, non-nullable   | `[payload]`                                   |
//! | unbound               | `[ref flag][type id][payload]` or `[null]`    |
//!
//! A side is bound when a class and codec pair is configured for it, or when
//! a generic hint names a class the registry declares sealed. Hints are
//! resolved on every call and never written back into the codec.

use crate::error::Error;
use crate::resolver::context::{CopyContext, ReadContext, WriteContext};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::Codec;
use crate::types::presence;
use crate::value::{MapObject, MapRef, Value};
use log::trace;
use std::fmt;
use std::sync::Arc;

/// A class every element on one side is known to be, with the codec writing it.
#[derive(Clone)]
pub struct ClassBinding {
    type_id: u32,
    codec: Arc<dyn Codec>,
}

impl ClassBinding {
    pub fn new(type_id: u32, codec: Arc<dyn Codec>) -> Self {
        ClassBinding { type_id, codec }
    }

    #[inline(always)]
    pub fn get_type_id(&self) -> u32 {
        self.type_id
    }
}

impl fmt::Debug for ClassBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBinding")
            .field("type_id", &self.type_id)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Side {
    Key,
    Value,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Side::Key => "key",
            Side::Value => "value",
        }
    }
}

/// Effective layout of one side for the duration of a call.
struct ElementPolicy {
    binding: Option<ClassBinding>,
    nullable: bool,
    side: Side,
}

impl ElementPolicy {
    /// Checks an element before anything is written, so a bad entry fails the
    /// whole map instead of leaving half a record in the stream.
    fn check(&self, element: &Value) -> Result<(), Error> {
        let Some(binding) = &self.binding else {
            return Ok(());
        };
        match element.type_id() {
            None if self.nullable => Ok(()),
            None => Err(Error::contract_violation(format!(
                "null {} found but {}s are bound to type {} and declared non-nullable",
                self.side.name(),
                self.side.name(),
                binding.type_id
            ))),
            Some(type_id) if type_id != binding.type_id => {
                Err(Error::type_mismatch(binding.type_id, type_id))
            }
            Some(_) => Ok(()),
        }
    }

    fn write(&self, context: &mut WriteContext, element: &Value) -> Result<(), Error> {
        let Some(binding) = &self.binding else {
            return context.write_tagged(element);
        };
        if self.nullable {
            if element.is_null() {
                context.writer.write_u8(presence::NULL);
                return Ok(());
            }
            context.writer.write_u8(presence::NOT_NULL);
        }
        context.write_known(element, binding.codec.as_ref())
    }

    fn read(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let Some(binding) = &self.binding else {
            return context.read_tagged();
        };
        if self.nullable {
            match context.reader.read_u8()? {
                presence::NULL => return Ok(Value::Null),
                presence::NOT_NULL => {}
                other => {
                    return Err(Error::invalid_data(format!(
                        "invalid {} presence byte {}",
                        self.side.name(),
                        other
                    )))
                }
            }
        }
        context.read_known(binding.codec.as_ref(), binding.type_id)
    }
}

/// Codec of one map binding.
///
/// ```rust
/// use tessel_core::serializer::map::MapCodec;
/// use tessel_core::tessel::Tessel;
/// use tessel_core::types::{INT32, STRING};
///
/// let tessel = Tessel::default();
/// let codec = MapCodec::default()
///     .key_class(STRING, tessel.codec_for(STRING).unwrap())
///     .value_class(INT32, tessel.codec_for(INT32).unwrap())
///     .values_nullable(false);
/// assert!(!codec.is_values_nullable());
/// ```
#[derive(Clone, Debug)]
pub struct MapCodec {
    key: Option<ClassBinding>,
    value: Option<ClassBinding>,
    keys_nullable: bool,
    values_nullable: bool,
    key_generic_hint: Option<u32>,
    value_generic_hint: Option<u32>,
}

impl Default for MapCodec {
    fn default() -> Self {
        MapCodec {
            key: None,
            value: None,
            keys_nullable: true,
            values_nullable: true,
            key_generic_hint: None,
            value_generic_hint: None,
        }
    }
}

impl MapCodec {
    /// Every key is exactly of class `type_id` and is written with `codec`.
    pub fn key_class(mut self, type_id: u32, codec: Arc<dyn Codec>) -> Self {
        self.key = Some(ClassBinding::new(type_id, codec));
        self
    }

    /// Every value is exactly of class `type_id` and is written with `codec`.
    pub fn value_class(mut self, type_id: u32, codec: Arc<dyn Codec>) -> Self {
        self.value = Some(ClassBinding::new(type_id, codec));
        self
    }

    pub fn keys_nullable(mut self, nullable: bool) -> Self {
        self.keys_nullable = nullable;
        self
    }

    pub fn values_nullable(mut self, nullable: bool) -> Self {
        self.values_nullable = nullable;
        self
    }

    /// Static generic parameters of the call site. A hint only takes effect
    /// for a side without an explicit class, and only if its class is sealed.
    pub fn generics(mut self, key_hint: Option<u32>, value_hint: Option<u32>) -> Self {
        self.key_generic_hint = key_hint;
        self.value_generic_hint = value_hint;
        self
    }

    pub fn get_key_binding(&self) -> Option<&ClassBinding> {
        self.key.as_ref()
    }

    pub fn get_value_binding(&self) -> Option<&ClassBinding> {
        self.value.as_ref()
    }

    pub fn is_keys_nullable(&self) -> bool {
        self.keys_nullable
    }

    pub fn is_values_nullable(&self) -> bool {
        self.values_nullable
    }

    fn resolve_side(
        explicit: &Option<ClassBinding>,
        hint: Option<u32>,
        side: Side,
        type_resolver: &TypeResolver,
    ) -> Result<Option<ClassBinding>, Error> {
        if explicit.is_some() {
            return Ok(explicit.clone());
        }
        let Some(hint) = hint else {
            return Ok(None);
        };
        if !type_resolver.is_sealed(hint) {
            trace!(
                "{} hint {} is not a sealed class, elements stay tagged",
                side.name(),
                hint
            );
            return Ok(None);
        }
        let codec = type_resolver.get_codec(hint)?;
        trace!("{} hint {} resolved to a bound codec", side.name(), hint);
        Ok(Some(ClassBinding::new(hint, codec.clone())))
    }

    fn resolve(&self, type_resolver: &TypeResolver) -> Result<(ElementPolicy, ElementPolicy), Error> {
        let key = ElementPolicy {
            binding: Self::resolve_side(&self.key, self.key_generic_hint, Side::Key, type_resolver)?,
            nullable: self.keys_nullable,
            side: Side::Key,
        };
        let value = ElementPolicy {
            binding: Self::resolve_side(
                &self.value,
                self.value_generic_hint,
                Side::Value,
                type_resolver,
            )?,
            nullable: self.values_nullable,
            side: Side::Value,
        };
        Ok((key, value))
    }

    pub fn encode(&self, context: &mut WriteContext, map: &MapObject) -> Result<(), Error> {
        let entries = map.entries();
        let len = entries.len();
        if len == 0 {
            context.writer.write_varuint32(0);
            return Ok(());
        }
        let (key_policy, value_policy) = self.resolve(context.get_type_resolver())?;
        for (key, value) in entries.iter() {
            key_policy.check(key)?;
            value_policy.check(value)?;
        }
        context.writer.write_varuint32(len as u32);
        for (key, value) in entries.iter() {
            key_policy.write(context, key)?;
            value_policy.write(context, value)?;
        }
        Ok(())
    }

    pub fn decode(&self, context: &mut ReadContext, type_id: u32) -> Result<Value, Error> {
        let instance = context.new_instance(type_id)?;
        let map = expect_map(&instance, type_id)?.clone();
        let len = context.reader.read_varuint32()?;
        if len == 0 {
            return Ok(instance);
        }
        context.check_collection_size(len, type_id)?;
        // Must precede the first element read: a self reference inside the
        // entries resolves to this instance.
        context.reference(&instance);
        let (key_policy, value_policy) = self.resolve(context.get_type_resolver())?;
        map.reserve(len as usize);
        for _ in 0..len {
            let key = key_policy.read(context)?;
            let value = value_policy.read(context)?;
            map.insert(key, value);
        }
        Ok(instance)
    }

    pub fn deep_copy(&self, context: &mut CopyContext, original: &MapRef) -> Result<Value, Error> {
        let instance = context.new_instance(original.type_id())?;
        let copy = expect_map(&instance, original.type_id())?.clone();
        context.reference(&Value::Map(original.clone()), &instance);
        let entries = original.entries();
        copy.reserve(entries.len());
        for (key, value) in entries.iter() {
            let key = context.copy(key)?;
            let value = context.copy(value)?;
            copy.insert(key, value);
        }
        Ok(instance)
    }
}

fn expect_map(instance: &Value, type_id: u32) -> Result<&MapRef, Error> {
    instance.as_map().ok_or_else(|| {
        Error::not_allowed(format!(
            "type {} is bound to the map codec but does not construct a map",
            type_id
        ))
    })
}

fn not_a_map(value: &Value) -> Error {
    match value.type_id() {
        Some(type_id) => Error::not_allowed(format!(
            "map codec cannot handle a value of type {}",
            type_id
        )),
        None => Error::contract_violation("null value passed to the map codec"),
    }
}

impl Codec for MapCodec {
    fn write(&self, context: &mut WriteContext, value: &Value) -> Result<(), Error> {
        let map = value.as_map().ok_or_else(|| not_a_map(value))?;
        self.encode(context, map)
    }

    fn read(&self, context: &mut ReadContext, type_id: u32) -> Result<Value, Error> {
        self.decode(context, type_id)
    }

    fn copy(&self, context: &mut CopyContext, value: &Value) -> Result<Value, Error> {
        let map = value.as_map().ok_or_else(|| not_a_map(value))?;
        self.deep_copy(context, map)
    }

    fn is_shared_ref(&self) -> bool {
        true
    }
}
