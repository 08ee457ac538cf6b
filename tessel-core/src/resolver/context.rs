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

//! Per-call state of a write, read or deep copy.
//!
//! Contexts own the stream cursor, the identity table and the nesting depth of
//! one call, and expose the engine operations codecs delegate to: tagged and
//! known element writes/reads, instance construction and identity registration.

use crate::buffer::{Reader, Writer};
use crate::config::Config;
use crate::error::Error;
use crate::resolver::ref_resolver::{RefReader, RefWriter};
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::Codec;
use crate::types::RefFlag;
use crate::value::Value;
use std::collections::HashMap;

fn depth_error(max_dyn_depth: u32, current_depth: u32) -> Error {
    Error::depth_exceed(format!(
        "Maximum dynamic object nesting depth ({}) exceeded. Current depth: {}. \
        This may indicate a circular reference written without reference tracking \
        or an overly deep object graph. Consider increasing max_dyn_depth if this is expected.",
        max_dyn_depth, current_depth
    ))
}

pub struct WriteContext<'a> {
    pub writer: Writer,
    type_resolver: &'a TypeResolver,
    config: &'a Config,
    pub ref_writer: RefWriter,
    current_depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(type_resolver: &'a TypeResolver, config: &'a Config) -> WriteContext<'a> {
        WriteContext {
            writer: Writer::default(),
            type_resolver,
            config,
            ref_writer: RefWriter::new(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    #[inline(always)]
    pub fn get_config(&self) -> &'a Config {
        self.config
    }

    /// Writes `value` with its ref flag and class tag, dispatching to the
    /// codec registered for its runtime class. Null is a valid value.
    pub fn write_tagged(&mut self, value: &Value) -> Result<(), Error> {
        let Some(type_id) = value.type_id() else {
            self.writer.write_i8(RefFlag::Null as i8);
            return Ok(());
        };
        let codec = self.type_resolver.get_codec(type_id)?;
        if self.write_ref_flag(value) {
            return Ok(());
        }
        self.writer.write_varuint32(type_id);
        self.write_payload(codec.as_ref(), value)
    }

    /// Writes `value` with a codec known to both peers, so no class tag is
    /// written. Reference-typed codecs still get a ref flag.
    pub fn write_known(&mut self, value: &Value, codec: &dyn Codec) -> Result<(), Error> {
        if value.is_null() {
            return Err(Error::contract_violation(
                "null value written through a codec bound as non-nullable",
            ));
        }
        if codec.is_shared_ref() && self.write_ref_flag(value) {
            return Ok(());
        }
        self.write_payload(codec, value)
    }

    /// Returns true if only a reference to an already written instance was needed.
    fn write_ref_flag(&mut self, value: &Value) -> bool {
        if self.config.is_track_ref() {
            self.ref_writer.try_write_ref(&mut self.writer, value)
        } else {
            self.writer.write_i8(RefFlag::NotNullValue as i8);
            false
        }
    }

    fn write_payload(&mut self, codec: &dyn Codec, value: &Value) -> Result<(), Error> {
        if !codec.is_shared_ref() {
            return codec.write(self, value);
        }
        self.inc_depth()?;
        let result = codec.write(self, value);
        self.dec_depth();
        result
    }

    #[inline(always)]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_dyn_depth() {
            return Err(depth_error(self.config.max_dyn_depth(), self.current_depth));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

pub struct ReadContext<'a, 'bf> {
    pub reader: Reader<'bf>,
    type_resolver: &'a TypeResolver,
    config: &'a Config,
    pub ref_reader: RefReader,
    current_depth: u32,
}

impl<'a, 'bf> ReadContext<'a, 'bf> {
    pub fn new(
        type_resolver: &'a TypeResolver,
        config: &'a Config,
        reader: Reader<'bf>,
    ) -> ReadContext<'a, 'bf> {
        ReadContext {
            reader,
            type_resolver,
            config,
            ref_reader: RefReader::new(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    #[inline(always)]
    pub fn get_config(&self) -> &'a Config {
        self.config
    }

    /// Reads a value written by [`WriteContext::write_tagged`].
    pub fn read_tagged(&mut self) -> Result<Value, Error> {
        let ref_flag = self.ref_reader.read_ref_flag(&mut self.reader)?;
        match ref_flag {
            RefFlag::Null => Ok(Value::Null),
            RefFlag::Ref => {
                let ref_id = self.ref_reader.read_ref_id(&mut self.reader)?;
                self.ref_reader.get_ref(ref_id)
            }
            RefFlag::NotNullValue | RefFlag::RefValue => {
                let type_id = self.reader.read_varuint32()?;
                let codec = self.type_resolver.get_codec(type_id)?;
                self.read_payload(codec.as_ref(), type_id, ref_flag)
            }
        }
    }

    /// Reads a value written by [`WriteContext::write_known`] with the same codec.
    pub fn read_known(&mut self, codec: &dyn Codec, type_id: u32) -> Result<Value, Error> {
        if !codec.is_shared_ref() {
            return codec.read(self, type_id);
        }
        let ref_flag = self.ref_reader.read_ref_flag(&mut self.reader)?;
        match ref_flag {
            RefFlag::Null => Err(Error::invalid_data(format!(
                "null flag found for a non-nullable value of type {}",
                type_id
            ))),
            RefFlag::Ref => {
                let ref_id = self.ref_reader.read_ref_id(&mut self.reader)?;
                let value = self.ref_reader.get_ref(ref_id)?;
                match value.type_id() {
                    Some(actual) if actual != type_id => {
                        Err(Error::type_mismatch(type_id, actual))
                    }
                    _ => Ok(value),
                }
            }
            RefFlag::NotNullValue | RefFlag::RefValue => {
                self.read_payload(codec, type_id, ref_flag)
            }
        }
    }

    fn read_payload(
        &mut self,
        codec: &dyn Codec,
        type_id: u32,
        ref_flag: RefFlag,
    ) -> Result<Value, Error> {
        if !codec.is_shared_ref() {
            return codec.read(self, type_id);
        }
        let ref_id = match ref_flag {
            RefFlag::RefValue => Some(self.ref_reader.reserve_ref_id()),
            _ => None,
        };
        self.inc_depth()?;
        self.ref_reader.begin(ref_id);
        let value = codec.read(self, type_id)?;
        self.ref_reader.end(&value);
        self.dec_depth();
        Ok(value)
    }

    /// Registers the instance currently being read so references to it
    /// inside its own contents resolve. Codecs call this before populating.
    #[inline(always)]
    pub fn reference(&mut self, value: &Value) {
        self.ref_reader.reference(value);
    }

    #[inline(always)]
    pub fn new_instance(&self, type_id: u32) -> Result<Value, Error> {
        self.type_resolver.new_instance(type_id)
    }

    /// Rejects a declared element count that cannot be backed by the remaining input.
    pub fn check_collection_size(&self, len: u32, type_id: u32) -> Result<(), Error> {
        let max = self.config.max_collection_size();
        if len > max {
            return Err(Error::invalid_data(format!(
                "declared size {} of type {} exceeds max_collection_size {}",
                len, type_id, max
            )));
        }
        // every element occupies at least one byte
        if len as usize > self.reader.remaining() {
            return Err(Error::invalid_data(format!(
                "declared size {} of type {} exceeds the {} remaining bytes",
                len,
                type_id,
                self.reader.remaining()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_dyn_depth() {
            return Err(depth_error(self.config.max_dyn_depth(), self.current_depth));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}

/// State of one deep copy: the original-to-copy identity table.
///
/// The table is always on, independent of `track_ref`, so shared and cyclic
/// sub-graphs are copied once and keep their shape.
pub struct CopyContext<'a> {
    type_resolver: &'a TypeResolver,
    config: &'a Config,
    copies: HashMap<usize, Value>,
    current_depth: u32,
}

impl<'a> CopyContext<'a> {
    pub fn new(type_resolver: &'a TypeResolver, config: &'a Config) -> CopyContext<'a> {
        CopyContext {
            type_resolver,
            config,
            copies: HashMap::new(),
            current_depth: 0,
        }
    }

    #[inline(always)]
    pub fn get_type_resolver(&self) -> &'a TypeResolver {
        self.type_resolver
    }

    /// Deep-copies any value through the codec registered for its class.
    pub fn copy(&mut self, value: &Value) -> Result<Value, Error> {
        let Some(type_id) = value.type_id() else {
            return Ok(Value::Null);
        };
        let codec = self.type_resolver.get_codec(type_id)?;
        let Some(addr) = value.ref_addr() else {
            return codec.copy(self, value);
        };
        if let Some(copy) = self.copies.get(&addr) {
            return Ok(copy.clone());
        }
        self.inc_depth()?;
        let copy = codec.copy(self, value)?;
        self.dec_depth();
        self.copies.entry(addr).or_insert_with(|| copy.clone());
        Ok(copy)
    }

    /// Records `copy` as the copy of `original` before the copy is populated.
    pub fn reference(&mut self, original: &Value, copy: &Value) {
        if let Some(addr) = original.ref_addr() {
            self.copies.insert(addr, copy.clone());
        }
    }

    #[inline(always)]
    pub fn new_instance(&self, type_id: u32) -> Result<Value, Error> {
        self.type_resolver.new_instance(type_id)
    }

    fn inc_depth(&mut self) -> Result<(), Error> {
        self.current_depth += 1;
        if self.current_depth > self.config.max_dyn_depth() {
            return Err(depth_error(self.config.max_dyn_depth(), self.current_depth));
        }
        Ok(())
    }

    fn dec_depth(&mut self) {
        self.current_depth = self.current_depth.saturating_sub(1);
    }
}
