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
use crate::serializer::Codec;
use crate::value::{ObjectRef, Value};

/// Codec of record classes: `[field count varuint32][tagged field]*`.
///
/// Records are reference types. Like maps, a decoded record is registered
/// before its fields are read so a field may point back at it.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructCodec;

fn expect_object(value: &Value) -> Result<&ObjectRef, Error> {
    value.as_object().ok_or_else(|| match value.type_id() {
        Some(type_id) => Error::not_allowed(format!(
            "struct codec cannot handle a value of type {}",
            type_id
        )),
        None => Error::contract_violation("null value passed to the struct codec"),
    })
}

impl Codec for StructCodec {
    fn write(&self, context: &mut WriteContext, value: &Value) -> Result<(), Error> {
        let object = expect_object(value)?;
        let fields = object.fields();
        context.writer.write_varuint32(fields.len() as u32);
        for field in fields.iter() {
            context.write_tagged(field)?;
        }
        Ok(())
    }

    fn read(&self, context: &mut ReadContext, type_id: u32) -> Result<Value, Error> {
        let instance = context.new_instance(type_id)?;
        let object = expect_object(&instance)?.clone();
        let len = context.reader.read_varuint32()?;
        context.check_collection_size(len, type_id)?;
        context.reference(&instance);
        for _ in 0..len {
            let field = context.read_tagged()?;
            object.push(field);
        }
        Ok(instance)
    }

    fn copy(&self, context: &mut CopyContext, value: &Value) -> Result<Value, Error> {
        let original = expect_object(value)?;
        let instance = context.new_instance(original.type_id())?;
        let copy = expect_object(&instance)?.clone();
        context.reference(value, &instance);
        for field in original.fields().iter() {
            let field = context.copy(field)?;
            copy.push(field);
        }
        Ok(instance)
    }

    fn is_shared_ref(&self) -> bool {
        true
    }
}
