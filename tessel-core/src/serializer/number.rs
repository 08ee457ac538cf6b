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
use crate::types::{FLOAT64, INT32, INT64};
use crate::value::Value;

macro_rules! impl_num_codec {
    ($codec:ident, $variant:ident, $type_id:expr, $writer:ident, $reader:ident) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $codec;

        impl Codec for $codec {
            #[inline(always)]
            fn write(&self, context: &mut WriteContext, value: &Value) -> Result<(), Error> {
                match value {
                    Value::$variant(v) => {
                        context.writer.$writer(*v);
                        Ok(())
                    }
                    other => Err(unexpected_value($type_id, other)),
                }
            }

            #[inline(always)]
            fn read(&self, context: &mut ReadContext, _type_id: u32) -> Result<Value, Error> {
                Ok(Value::$variant(context.reader.$reader()?))
            }

            #[inline(always)]
            fn copy(&self, _context: &mut CopyContext, value: &Value) -> Result<Value, Error> {
                Ok(value.clone())
            }
        }
    };
}

impl_num_codec!(I32Codec, I32, INT32, write_varint32, read_varint32);
impl_num_codec!(I64Codec, I64, INT64, write_varint64, read_varint64);
impl_num_codec!(F64Codec, F64, FLOAT64, write_f64, read_f64);
