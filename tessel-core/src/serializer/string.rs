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
use crate::resolver::context::{CopyContext, ReadContext, WriteContext};
use crate::serializer::util::unexpected_value;
use crate::serializer::Codec;
use crate::types::STRING;
use crate::value::Value;

/// UTF-8 strings: `[byte length varuint32][bytes]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn write(&self, context: &mut WriteContext, value: &Value) -> Result<(), Error> {
        match value {
            Value::String(s) => {
                context.writer.write_varuint32(s.len() as u32);
                context.writer.write_utf8_string(s);
                Ok(())
            }
            other => Err(unexpected_value(STRING, other)),
        }
    }

    fn read(&self, context: &mut ReadContext, _type_id: u32) -> Result<Value, Error> {
        let len = context.reader.read_varuint32()?;
        Ok(Value::String(
            context.reader.read_utf8_string(len as usize)?,
        ))
    }

    fn copy(&self, _context: &mut CopyContext, value: &Value) -> Result<Value, Error> {
        Ok(value.clone())
    }
}
