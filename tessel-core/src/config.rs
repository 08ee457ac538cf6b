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

/// Configuration for a Tessel engine.
///
/// Shared between the `Tessel` instance and the per-call contexts so that
/// write, read and copy agree on every setting.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether reference tracking is enabled.
    /// When enabled, shared and circular references between maps and objects
    /// are preserved; when disabled every occurrence is written in full.
    pub track_ref: bool,
    /// Maximum nesting depth of maps and objects on write, read and copy.
    pub max_dyn_depth: u32,
    /// Upper bound on the declared entry count of a map or object on read.
    pub max_collection_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            track_ref: true,
            max_dyn_depth: 64,
            max_collection_size: i32::MAX as u32,
        }
    }
}

impl Config {
    /// Creates a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if reference tracking is enabled.
    #[inline(always)]
    pub fn is_track_ref(&self) -> bool {
        self.track_ref
    }

    /// Get maximum dynamic depth.
    #[inline(always)]
    pub fn max_dyn_depth(&self) -> u32 {
        self.max_dyn_depth
    }

    #[inline(always)]
    pub fn max_collection_size(&self) -> u32 {
        self.max_collection_size
    }
}
