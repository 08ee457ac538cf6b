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

//! Codecs and the trait the engine dispatches through.
//!
//! A [`Codec`] writes and reads the payload of one class. The engine writes
//! the ref flag and the class tag around it; codecs of reference-typed
//! classes (maps, records) additionally register the instance they construct
//! so cycles through it resolve.

use crate::error::Error;
use crate::resolver::context::{CopyContext, ReadContext, WriteContext};
use crate::value::Value;

pub mod bool;
pub mod map;
pub mod number;
pub mod string;
pub mod struct_;
mod util;

pub trait Codec: Send + Sync + 'static {
    /// Writes the payload of `value`, without ref flag or class tag.
    fn write(&self, context: &mut WriteContext, value: &Value) -> Result<(), Error>;

    /// Reads a payload of class `type_id`.
    fn read(&self, context: &mut ReadContext, type_id: u32) -> Result<Value, Error>;

    fn copy(&self, context: &mut CopyContext, value: &Value) -> Result<Value, Error>;

    /// Whether values of this codec are reference types taking part in identity tracking.
    fn is_shared_ref(&self) -> bool {
        false
    }
}
