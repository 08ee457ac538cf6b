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

//! Error type shared by every codec and resolver in the crate.
//!
//! Error constructors sit on the error path of every buffer read and type
//! check. They are `#[cold]` and `#[track_caller]` so the successful paths stay
//! small; keep these attributes when adding new constructors.

use std::borrow::Cow;

use thiserror::Error;

/// Set `TESSEL_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("TESSEL_PANIC_ON_ERROR").is_some();

/// Check if `TESSEL_PANIC_ON_ERROR` was set at compile time.
/// Tests expecting an error return early when it is.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for Tessel serialization, deserialization and deep copy.
///
/// # Always use the static constructor functions
///
/// Do not build variants with the enum syntax. The constructors convert the
/// message via `Into<Cow<'static, str>>` and honour `TESSEL_PANIC_ON_ERROR`.
///
/// ```rust
/// use tessel_core::error::Error;
///
/// let err = Error::invalid_data("map size exceeds remaining input");
/// let err = Error::unsupported_type(format!("no codec registered for type id {}", 300));
/// let err = Error::type_mismatch(4, 12);
/// ```
///
/// # Taxonomy
///
/// - Format errors: [`Error::InvalidData`] and [`Error::BufferOutOfBound`]. The
///   stream is malformed, truncated or declares an implausible size.
/// - [`Error::UnsupportedType`]: a runtime class has no registered codec.
/// - [`Error::ContractViolation`]: the caller broke a declared binding, for
///   example a null value on a side configured as non-nullable.
/// - Everything else is a typing or graph error surfaced from the engine.
///
/// # Debug mode
///
/// ```bash
/// RUST_BACKTRACE=1 TESSEL_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Runtime class differs from the class a codec was bound to.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("Type mismatch: expected type id {0}, found type id {1}")]
    TypeMismatch(u32, u32),

    /// Read past the end of the input.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Invalid, corrupted or implausible data.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Reference id that was never registered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_ref`] instead.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// No codec registered for a runtime class.
    ///
    /// Do not construct this variant directly; use [`Error::unsupported_type`] instead.
    #[error("{0}")]
    UnsupportedType(Cow<'static, str>),

    /// Caller supplied data that breaks a declared binding.
    ///
    /// Do not construct this variant directly; use [`Error::contract_violation`] instead.
    #[error("{0}")]
    ContractViolation(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Operation not allowed for this type or in this state.
    ///
    /// Do not construct this variant directly; use [`Error::not_allowed`] instead.
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),

    /// Generic error.
    ///
    /// Do not construct this variant directly; use [`Error::unknown`] instead.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::TypeMismatch`] from the expected and the actual type id.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch(expected: u32, actual: u32) -> Self {
        let err = Error::TypeMismatch(expected, actual);
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    ///
    /// ```
    /// use tessel_core::error::Error;
    ///
    /// let err = Error::buffer_out_of_bound(10, 20, 25);
    /// assert_eq!(err.to_string(), "Buffer out of bound: 10 + 20 > 25");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidData`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidRef`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidRef(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnsupportedType`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported_type<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnsupportedType(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::ContractViolation`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn contract_violation<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::ContractViolation(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::NotAllowed`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_allowed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::NotAllowed(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unknown`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("TESSEL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Whether the error means the input bytes are malformed.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::InvalidData(_) | Error::BufferOutOfBound(..))
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use tessel_core::ensure;
/// use tessel_core::error::Error;
///
/// fn check_size(n: u32) -> Result<(), Error> {
///     ensure!(n > 0, "size must be positive");
///     ensure!(n < 10, Error::invalid_data(format!("size {} too large", n)));
///     Ok(())
/// }
/// assert!(check_size(3).is_ok());
/// assert!(check_size(11).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}
