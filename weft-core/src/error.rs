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

//! Error type shared by registration, encoding and decoding.
//!
//! Variants fall into four families that callers commonly branch on:
//!
//! - registration errors ([`Error::Registration`], [`Error::UnregisteredType`]) are
//!   configuration mistakes made at startup and are never recoverable;
//! - read errors (unknown wire id, unexpected null, type mismatch, bad reference,
//!   truncated or malformed data) mean the bytes cannot produce the requested value;
//! - write errors mean a value cannot be represented on the wire;
//! - [`Error::Unresolved`] means a deferred reference could not be resolved *yet*.
//!
//! Always build errors through the constructor functions, never through the
//! variants directly.
//!
//! ## Debugging
//!
//! Compile with `WEFT_PANIC_ON_ERROR=1` to panic at the exact site where an error
//! is created:
//!
//! ```bash
//! RUST_BACKTRACE=1 WEFT_PANIC_ON_ERROR=1 cargo test
//! ```

use std::borrow::Cow;

use thiserror::Error;

/// Set at compile time through the `WEFT_PANIC_ON_ERROR` environment variable.
pub const PANIC_ON_ERROR: bool = option_env!("WEFT_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Duplicate type or id, reserved id, closure type or duplicate field tag.
    #[error("registration error: {0}")]
    Registration(Cow<'static, str>),

    /// A type was used for encoding or decoding without being registered.
    #[error("type is not registered: {0}")]
    UnregisteredType(Cow<'static, str>),

    /// The stream carries a type id that no registration knows about.
    #[error("unregistered type id {0} encountered in stream")]
    UnknownTypeId(u16),

    #[error("type mismatch: {0}")]
    TypeMismatch(Cow<'static, str>),

    #[error("unexpected null: {0}")]
    UnexpectedNull(Cow<'static, str>),

    /// A reference marker points to no instance, to an instance of the wrong
    /// kind, or two instances claim one reference id.
    #[error("invalid reference: {0}")]
    InvalidRef(Cow<'static, str>),

    #[error("invalid data: {0}")]
    InvalidData(Cow<'static, str>),

    #[error("buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    #[error("encoding error: {0}")]
    EncodingError(Cow<'static, str>),

    #[error("write error: {0}")]
    Write(Cow<'static, str>),

    #[error("maximum depth exceeded: {0}")]
    DepthExceed(Cow<'static, str>),

    /// A deferred reference found nothing in the live state it was resolved against.
    #[error("unresolved reference: {0}")]
    Unresolved(Cow<'static, str>),

}

macro_rules! message_constructors {
    ($($(#[$doc:meta])* $ctor:ident => $variant:ident;)*) => {
        impl Error {
            $(
                $(#[$doc])*
                #[inline(always)]
                #[cold]
                #[track_caller]
                pub fn $ctor<S: Into<Cow<'static, str>>>(s: S) -> Self {
                    Error::$variant(s.into()).checked()
                }
            )*
        }
    };
}

message_constructors! {
    /// Creates an [`Error::Registration`].
    registration => Registration;
    /// Creates an [`Error::UnregisteredType`], usually from `std::any::type_name`.
    unregistered_type => UnregisteredType;
    /// Creates an [`Error::TypeMismatch`].
    type_mismatch => TypeMismatch;
    /// Creates an [`Error::UnexpectedNull`].
    unexpected_null => UnexpectedNull;
    /// Creates an [`Error::InvalidRef`].
    invalid_ref => InvalidRef;
    /// Creates an [`Error::InvalidData`].
    invalid_data => InvalidData;
    /// Creates an [`Error::EncodingError`].
    encoding_error => EncodingError;
    /// Creates an [`Error::Write`].
    write_error => Write;
    /// Creates an [`Error::DepthExceed`].
    depth_exceed => DepthExceed;
    /// Creates an [`Error::Unresolved`].
    unresolved => Unresolved;
}

impl Error {
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_type_id(id: u16) -> Self {
        Error::UnknownTypeId(id).checked()
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        Error::BufferOutOfBound(offset, length, capacity).checked()
    }

    #[inline(always)]
    #[track_caller]
    fn checked(self) -> Self {
        if PANIC_ON_ERROR {
            panic!("WEFT_PANIC_ON_ERROR: {}", self);
        }
        self
    }

    /// True for startup configuration mistakes.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Error::Registration(_) | Error::UnregisteredType(_))
    }

    /// True when the bytes could not be decoded into the requested value.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownTypeId(_)
                | Error::TypeMismatch(_)
                | Error::UnexpectedNull(_)
                | Error::InvalidRef(_)
                | Error::InvalidData(_)
                | Error::BufferOutOfBound(..)
                | Error::EncodingError(_)
        )
    }

    pub fn is_write_error(&self) -> bool {
        matches!(self, Error::Write(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::Unresolved(_))
    }

    /// Appends the Rust type name to read and type errors.
    #[inline(never)]
    pub fn with_type<T: ?Sized + 'static>(self) -> Error {
        let name = std::any::type_name::<T>();
        match self {
            Error::TypeMismatch(s) => Error::TypeMismatch(format!("{s} (reading {name})").into()),
            Error::UnexpectedNull(s) => {
                Error::UnexpectedNull(format!("{s} (reading {name})").into())
            }
            other => other,
        }
    }
}

/// Ensures a condition holds, otherwise returns the given [`enum@Error`]
/// or an [`Error::InvalidData`] built from a message.
///
/// ```
/// use weft_core::ensure;
/// use weft_core::error::Error;
///
/// fn check_run(run: i32, remaining: usize) -> Result<(), Error> {
///     ensure!(run > 0, "null run must be positive");
///     ensure!(run as usize <= remaining, "null run {} overflows array", run);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::InvalidData`].
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_data($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_data(format!($fmt, $($arg)*)))
    };
}
