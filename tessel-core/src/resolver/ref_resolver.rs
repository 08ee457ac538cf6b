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

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::types::RefFlag;
use crate::value::Value;
use log::trace;
use std::collections::HashMap;

/// Reference writer for tracking shared references during serialization.
///
/// RefWriter maps the address of every map or object written so far to a
/// reference ID. When the same instance is met again only a reference is
/// written, which is how shared and circular references survive a round trip.
///
/// # Examples
///
/// ```rust
/// use tessel_core::buffer::Writer;
/// use tessel_core::resolver::ref_resolver::RefWriter;
/// use tessel_core::value::{MapObject, Value};
///
/// let mut ref_writer = RefWriter::new();
/// let mut writer = Writer::default();
/// let map = Value::from(MapObject::hash_map());
///
/// // First encounter - returns false, the map must be written in full
/// assert!(!ref_writer.try_write_ref(&mut writer, &map));
///
/// // Second encounter - returns true, a reference was written
/// assert!(ref_writer.try_write_ref(&mut writer, &map.clone()));
/// ```
#[derive(Default)]
pub struct RefWriter {
    /// Maps instance addresses to reference IDs
    refs: HashMap<usize, u32>,
    /// Keeps every registered instance alive so an address is never reused within one call
    retained: Vec<Value>,
}

impl RefWriter {
    /// Creates a new RefWriter instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to write a reference for a map or object.
    ///
    /// Writes `Ref` followed by the reference ID and returns true if the
    /// instance was seen before. Otherwise registers it, writes `RefValue` and
    /// returns false so the caller writes the instance in full. Scalars get
    /// `NotNullValue` and are never registered.
    pub fn try_write_ref(&mut self, writer: &mut Writer, value: &Value) -> bool {
        let Some(addr) = value.ref_addr() else {
            writer.write_i8(RefFlag::NotNullValue as i8);
            return false;
        };
        if let Some(&ref_id) = self.refs.get(&addr) {
            writer.write_i8(RefFlag::Ref as i8);
            writer.write_varuint32(ref_id);
            true
        } else {
            let ref_id = self.retained.len() as u32;
            self.refs.insert(addr, ref_id);
            self.retained.push(value.clone());
            writer.write_i8(RefFlag::RefValue as i8);
            false
        }
    }

    /// Clear all stored references.
    pub fn clear(&mut self) {
        self.refs.clear();
        self.retained.clear();
    }
}

/// Reference reader for resolving shared references during deserialization.
///
/// Every `RefValue` read reserves a slot. The codec decoding that value fills
/// the slot through [`RefReader::reference`] as soon as the empty instance
/// exists, before reading its contents; a later `Ref` to the same ID inside
/// those contents then resolves to the instance being populated. If a codec
/// never calls `reference`, the slot is filled when the codec returns.
#[derive(Default)]
pub struct RefReader {
    refs: Vec<Option<Value>>,
    /// One entry per value currently being read: its reserved slot, if any
    pending: Vec<Option<u32>>,
}

impl RefReader {
    /// Creates a new RefReader instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_ref_flag(&self, reader: &mut Reader) -> Result<RefFlag, Error> {
        let flag_value = reader.read_i8()?;
        RefFlag::try_from(flag_value)
            .map_err(|_| Error::invalid_data(format!("Invalid reference flag: {}", flag_value)))
    }

    pub fn read_ref_id(&self, reader: &mut Reader) -> Result<u32, Error> {
        reader.read_varuint32()
    }

    /// Reserves the next reference ID; its value is supplied later.
    pub fn reserve_ref_id(&mut self) -> u32 {
        let ref_id = self.refs.len() as u32;
        self.refs.push(None);
        ref_id
    }

    /// Marks the start of reading one value, with its reserved slot if it is tracked.
    pub fn begin(&mut self, ref_id: Option<u32>) {
        self.pending.push(ref_id);
    }

    /// Marks the end of reading the innermost value and fills its slot if still empty.
    pub fn end(&mut self, value: &Value) {
        if let Some(Some(ref_id)) = self.pending.pop() {
            let slot = &mut self.refs[ref_id as usize];
            if slot.is_none() {
                *slot = Some(value.clone());
            }
        }
    }

    /// Registers the instance of the value currently being read.
    pub fn reference(&mut self, value: &Value) {
        if let Some(Some(ref_id)) = self.pending.last() {
            trace!("registered reference {} before population", ref_id);
            self.refs[*ref_id as usize] = Some(value.clone());
        }
    }

    /// Get a previously registered value by reference ID.
    pub fn get_ref(&self, ref_id: u32) -> Result<Value, Error> {
        match self.refs.get(ref_id as usize) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(Error::invalid_ref(format!(
                "reference {} used before its instance was registered",
                ref_id
            ))),
            None => Err(Error::invalid_ref(format!(
                "reference {} out of range, {} registered",
                ref_id,
                self.refs.len()
            ))),
        }
    }

    /// Clear all stored references.
    pub fn clear(&mut self) {
        self.refs.clear();
        self.pending.clear();
    }
}
