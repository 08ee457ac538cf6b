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

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Leading byte of every tagged value and of every bound reference-typed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum RefFlag {
    Null = -3,
    // Ref indicates that object is a not-null value.
    // We don't use another byte to indicate REF, so that we can save one byte.
    Ref = -2,
    // NotNullValueFlag indicates that the object is a non-null value.
    NotNullValue = -1,
    // RefValueFlag indicates that the object is a referencable and first read.
    RefValue = 0,
}

/// Ids of the classes the engine registers on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum TypeId {
    BOOL = 1,
    INT32 = 4,
    INT64 = 6,
    FLOAT64 = 11,
    STRING = 12,
    HASH_MAP = 23,
    LINKED_MAP = 24,
}

pub const BOOL: u32 = TypeId::BOOL as u32;
pub const INT32: u32 = TypeId::INT32 as u32;
pub const INT64: u32 = TypeId::INT64 as u32;
pub const FLOAT64: u32 = TypeId::FLOAT64 as u32;
pub const STRING: u32 = TypeId::STRING as u32;
pub const HASH_MAP: u32 = TypeId::HASH_MAP as u32;
pub const LINKED_MAP: u32 = TypeId::LINKED_MAP as u32;

/// Ids below this value are reserved for built-in classes.
pub const MIN_USER_TYPE_ID: u32 = 64;

/// Presence byte written before a bound, nullable key or value.
pub mod presence {
    pub const NULL: u8 = 0;
    pub const NOT_NULL: u8 = 1;
}

pub mod config_flags {
    pub const IS_NULL_FLAG: u8 = 1 << 0;
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 1 << 1;
}
