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

//! # Tessel Core
//!
//! Core of the Tessel object-graph serializer. A graph of dynamic [`Value`]s
//! (scalars, maps and records, possibly shared or cyclic) is written to a
//! compact little-endian byte stream and read back into an equivalent graph.
//!
//! ## Architecture
//!
//! - **`tessel`**: the engine, owning the configuration and the type registry
//! - **`buffer`**: bounds-checked `Reader` and growable `Writer`
//! - **`serializer`**: the `Codec` trait and the codecs for scalars, maps and records
//! - **`resolver`**: type registry, reference tracking and per-call contexts
//! - **`value`**: the dynamic value model
//! - **`types`**: ref flags, built-in type ids and header flags
//! - **`error`**: error type
//!
//! ## Maps
//!
//! [`MapCodec`](serializer::map::MapCodec) writes `[size][key value]*`. Each
//! side is either written fully tagged, or, when bound to a known class,
//! without the class tag and optionally without the presence byte:
//!
//! ```rust
//! use tessel_core::serializer::map::MapCodec;
//! use tessel_core::tessel::Tessel;
//! use tessel_core::types::{INT32, STRING};
//! use tessel_core::value::{MapKind, MapObject, Value};
//!
//! let mut tessel = Tessel::default();
//! let codec = MapCodec::default()
//!     .key_class(STRING, tessel.codec_for(STRING).unwrap())
//!     .value_class(INT32, tessel.codec_for(INT32).unwrap())
//!     .keys_nullable(false)
//!     .values_nullable(false);
//! tessel.register_map(100, "Scores", MapKind::Hash, codec).unwrap();
//!
//! let scores = MapObject::new(100, MapKind::Hash);
//! scores.insert("alice", 3);
//! let bytes = tessel.serialize(&Value::from(scores.clone())).unwrap();
//! let decoded = tessel.deserialize(&bytes).unwrap();
//! assert!(decoded.content_eq(&Value::from(scores)));
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod resolver;
pub mod serializer;
pub mod tessel;
pub mod types;
pub mod value;

pub use config::Config;
pub use error::Error;
pub use tessel::Tessel;
pub use value::{MapKind, MapObject, MapRef, Object, ObjectRef, Value};
