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
use crate::value::Value;

/// Error for a value that cannot be handled by a codec bound to `expected`.
#[cold]
pub(crate) fn unexpected_value(expected: u32, value: &Value) -> Error {
    match value.type_id() {
        Some(actual) => Error::type_mismatch(expected, actual),
        None => Error::contract_violation(format!(
            "null value passed to the codec of type {}",
            expected
        )),
    }
}
