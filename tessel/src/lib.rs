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

//! # Tessel
//!
//! Binary serializer for dynamic object graphs of scalars, maps and records,
//! with shared and circular references preserved.
//!
//! ## Key Features
//!
//! - **Compact maps**: key and value sides bound to a known class skip the
//!   per-element class tag, and sides declared non-nullable skip the presence byte
//! - **Reference tracking**: a map reachable twice is written once; a map
//!   containing itself decodes to a map containing itself
//! - **Deep copy**: copies a graph without serializing, preserving its shape
//! - **Bounded input handling**: truncated or implausible input fails with a
//!   format error before any large allocation
//!
//! ## Getting Started
//!
//! ```rust
//! use tessel::{MapObject, Tessel, Value};
//!
//! # fn main() -> Result<(), tessel::Error> {
//! let tessel = Tessel::default();
//!
//! let inner = MapObject::from_pairs([("x", 1)]);
//! let outer = MapObject::hash_map();
//! outer.insert("first", inner.clone());
//! outer.insert("second", inner);
//!
//! let bytes = tessel.serialize(&Value::from(outer))?;
//! let decoded = tessel.deserialize(&bytes)?;
//! let decoded = decoded.as_map().unwrap();
//! // both entries point at the same decoded map
//! assert!(decoded
//!     .get(&Value::from("first"))
//!     .unwrap()
//!     .ptr_eq(&decoded.get(&Value::from("second")).unwrap()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Binding map sides
//!
//! ```rust
//! use tessel::{MapCodec, MapKind, MapObject, Tessel, TypeId, Value};
//!
//! # fn main() -> Result<(), tessel::Error> {
//! let mut tessel = Tessel::default();
//! let int32 = TypeId::INT32 as u32;
//! let codec = MapCodec::default()
//!     .generics(Some(int32), Some(int32))
//!     .keys_nullable(false);
//! tessel.register_map(64, "Histogram", MapKind::Linked, codec)?;
//!
//! let histogram = MapObject::new(64, MapKind::Linked);
//! histogram.insert(1, 10);
//! histogram.insert(2, Value::Null);
//! let bytes = tessel.serialize(&Value::from(histogram.clone()))?;
//! assert!(tessel.deserialize(&bytes)?.content_eq(&Value::from(histogram)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns `Result<_, Error>`. Malformed input surfaces as
//! [`Error::InvalidData`] or [`Error::BufferOutOfBound`]
//! ([`Error::is_format_error`]), an unregistered runtime class as
//! [`Error::UnsupportedType`], and a null on a side declared non-nullable as
//! [`Error::ContractViolation`].

pub use tessel_core::{
    error::Error,
    serializer::map::MapCodec,
    serializer::Codec,
    tessel::Tessel,
    types::TypeId,
    value::{MapKind, MapObject, MapRef, Object, ObjectRef, Value},
    Config,
};
