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
use byteorder::{ByteOrder, LittleEndian};

#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn reset(&mut self) {
        // keep capacity and reset len to 0
        self.bf.clear();
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bf.reserve(additional);
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.reserve(v.len());
        self.bf.extend_from_slice(v);
        v.len()
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_u64(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    pub fn write_f64(&mut self, value: f64) {
        let mut buf = [0u8; 8];
        LittleEndian::write_f64(&mut buf, value);
        self.bf.extend_from_slice(&buf);
    }

    pub fn write_varint32(&mut self, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varuint32(zigzag)
    }

    /// Writes 7 bits per byte, low group first, high bit set on every byte but the last.
    pub fn write_varuint32(&mut self, value: u32) {
        self.write_varuint64(value as u64)
    }

    pub fn write_varint64(&mut self, value: i64) {
        let zigzag = ((value << 1) ^ (value >> 63)) as u64;
        self.write_varuint64(zigzag)
    }

    pub fn write_varuint64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.bf.push((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }

    pub fn write_utf8_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }
}

/// Bounds-checked cursor over an input slice.
///
/// Every read fails with [`Error::BufferOutOfBound`] instead of reading past the
/// end, so truncated input always surfaces as a format error.
pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    #[inline(always)]
    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    /// Number of unread bytes.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    pub fn slice_after_cursor(&self) -> &'a [u8] {
        &self.bf[self.cursor..]
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check_bound(1)?;
        let result = self.bf[self.cursor];
        self.cursor += 1;
        Ok(result)
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let result = LittleEndian::read_u16(self.read_bytes(2)?);
        Ok(result)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let result = LittleEndian::read_u32(self.read_bytes(4)?);
        Ok(result)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let result = LittleEndian::read_u64(self.read_bytes(8)?);
        Ok(result)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        let result = LittleEndian::read_f64(self.read_bytes(8)?);
        Ok(result)
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let start = self.cursor;
        let value = self.read_varuint64()?;
        if value > u32::MAX as u64 {
            return Err(Error::invalid_data(format!(
                "varuint32 at offset {} overflows: {}",
                start, value
            )));
        }
        Ok(value as u32)
    }

    pub fn read_varint32(&mut self) -> Result<i32, Error> {
        let encoded = self.read_varuint32()?;
        Ok(((encoded >> 1) as i32) ^ -((encoded & 1) as i32))
    }

    pub fn read_varuint64(&mut self) -> Result<u64, Error> {
        let start = self.cursor;
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift == 63 && b > 1 {
                return Err(Error::invalid_data(format!(
                    "varuint64 at offset {} overflows",
                    start
                )));
            }
            result |= ((b & 0x7F) as u64) << shift;
            if b & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_varint64(&mut self) -> Result<i64, Error> {
        let encoded = self.read_varuint64()?;
        Ok(((encoded >> 1) as i64) ^ -((encoded & 1) as i64))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.check_bound(len)?;
        let s = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(s)
    }

    pub fn read_utf8_string(&mut self, len: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::invalid_data(format!("invalid utf-8 string: {}", e)))
    }
}
