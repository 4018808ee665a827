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

//! Error type shared by every stage of the graph engine.
//!
//! Constructors are marked `#[cold]` so the success paths of the primitive codec
//! and the per-node dispatch stay lean.

use std::borrow::Cow;

use thiserror::Error;

/// Global flag to check if BLOBGRAPH_PANIC_ON_ERROR environment variable is set at compile time.
/// Set BLOBGRAPH_PANIC_ON_ERROR=1 at compile time to enable panic on error.
pub const PANIC_ON_ERROR: bool = option_env!("BLOBGRAPH_PANIC_ON_ERROR").is_some();

/// Check if BLOBGRAPH_PANIC_ON_ERROR environment variable is set.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for graph serialization and deserialization.
///
/// # Always use the constructor functions
///
/// Do not build variants with enum syntax; call [`Error::invalid_data`],
/// [`Error::missing_field`] and friends instead. They accept anything that
/// converts into `Cow<'static, str>` and honour `BLOBGRAPH_PANIC_ON_ERROR`.
///
/// ```rust
/// use blobgraph_core::error::Error;
///
/// let err = Error::invalid_data("bad count attribute");
/// let err = Error::type_mismatch("List", "HashMap");
/// assert!(err.is_data_error());
/// ```
///
/// # Error families
///
/// * configuration errors ([`Error::Config`], [`Error::Unsupported`]) are raised when a
///   type cannot be described or registered and are never swallowed;
/// * data errors ([`Error::InvalidData`], [`Error::MissingEntry`], [`Error::MissingField`],
///   [`Error::UnknownClass`], [`Error::InvalidRef`], [`Error::TypeMismatch`],
///   [`Error::ParseError`]) describe a container that does not match the expected graph;
/// * [`Error::Archive`] and [`Error::BufferOutOfBound`] come from the container codecs;
/// * [`Error::RegistryClosed`] rejects registration on a sealed registry.
///
/// ## Debug Mode: BLOBGRAPH_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 BLOBGRAPH_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// When enabled, every constructor panics with the message so the creation site shows up
/// in the backtrace.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A type description or registration is invalid.
    ///
    /// Do not construct this variant directly; use [`Error::config`] instead.
    #[error("{0}")]
    Config(Cow<'static, str>),

    /// The runtime type has no representation in the graph format.
    ///
    /// Do not construct this variant directly; use [`Error::unsupported`] instead.
    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    /// Invalid or corrupted data encountered.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_data`] instead.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// A blob expected by the reader is absent from the container.
    ///
    /// Do not construct this variant directly; use [`Error::missing_entry`] instead.
    #[error("Missing entry: {0}")]
    MissingEntry(Cow<'static, str>),

    /// A required record member has no stored value.
    ///
    /// Do not construct this variant directly; use [`Error::missing_field`] instead.
    #[error("Missing required field `{0}` at `{1}`")]
    MissingField(Cow<'static, str>, Cow<'static, str>),

    /// A recorded class identifier is not registered for the declared type.
    ///
    /// Do not construct this variant directly; use [`Error::unknown_class`] instead.
    #[error("Unknown class: {0}")]
    UnknownClass(Cow<'static, str>),

    /// A pointer record is malformed or targets a node of another type.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_ref`] instead.
    #[error("{0}")]
    InvalidRef(Cow<'static, str>),

    /// The recorded class does not fit the declared slot.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("Type mismatch: declared = {0}, recorded = {1}")]
    TypeMismatch(Cow<'static, str>, Cow<'static, str>),

    /// A stored string could not be parsed back into its primitive kind.
    ///
    /// Do not construct this variant directly; use [`Error::parse_error`] instead.
    #[error("{0}")]
    ParseError(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// The container codec failed.
    ///
    /// Do not construct this variant directly; use [`Error::archive`] instead.
    #[error("{0}")]
    Archive(Cow<'static, str>),

    /// Buffer boundary violation while decoding a container.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Registration attempted on a sealed type registry.
    ///
    /// Do not construct this variant directly; use [`Error::registry_closed`] instead.
    #[error("{0}")]
    RegistryClosed(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::Config`].
    ///
    /// If `BLOBGRAPH_PANIC_ON_ERROR` environment variable is set, this will panic with the error message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn config<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Config(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unsupported`].
    ///
    /// If `BLOBGRAPH_PANIC_ON_ERROR` environment variable is set, this will panic with the error message.
    ///
    /// # Example
    /// ```
    /// use blobgraph_core::error::Error;
    ///
    /// let err = Error::unsupported(format!("type {} is not registered", "Node"));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unsupported(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidData`].
    ///
    /// If `BLOBGRAPH_PANIC_ON_ERROR` environment variable is set, this will panic with the error message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::MissingEntry`] naming the absent blob.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_entry<S: Into<Cow<'static, str>>>(name: S) -> Self {
        let err = Error::MissingEntry(name.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::MissingField`] for `field` of the record stored at `path`.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_field<F, P>(field: F, path: P) -> Self
    where
        F: Into<Cow<'static, str>>,
        P: Into<Cow<'static, str>>,
    {
        let err = Error::MissingField(field.into(), path.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnknownClass`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_class<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnknownClass(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::InvalidRef`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_ref<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidRef(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeMismatch`] from the declared and recorded class names.
    ///
    /// If `BLOBGRAPH_PANIC_ON_ERROR` environment variable is set, this will panic with the error message.
    ///
    /// # Example
    /// ```
    /// use blobgraph_core::error::Error;
    ///
    /// let err = Error::type_mismatch("SortedSet", "HashMap");
    /// assert_eq!(err.to_string(), "Type mismatch: declared = SortedSet, recorded = HashMap");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<D, R>(declared: D, recorded: R) -> Self
    where
        D: Into<Cow<'static, str>>,
        R: Into<Cow<'static, str>>,
    {
        let err = Error::TypeMismatch(declared.into(), recorded.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::ParseError`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn parse_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::ParseError(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Archive`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn archive<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Archive(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::RegistryClosed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn registry_closed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::RegistryClosed(s.into());
        if PANIC_ON_ERROR {
            panic!("BLOBGRAPH_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// True for errors caused by the container contents rather than by the types involved.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidData(_)
                | Error::MissingEntry(_)
                | Error::MissingField(_, _)
                | Error::UnknownClass(_)
                | Error::InvalidRef(_)
                | Error::TypeMismatch(_, _)
                | Error::ParseError(_)
        )
    }

    /// True when a failure on an optional member may be dropped.
    ///
    /// Everything but configuration errors and the depth guard qualifies.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Config(_) | Error::DepthExceed(_) | Error::RegistryClosed(_)
        )
    }

    /// Appends the path of the node being processed to data errors that lack one.
    #[inline(never)]
    pub fn at_path(self, path: &str) -> Error {
        match self {
            Error::InvalidData(s) => Error::InvalidData(format!("{s} (at `{path}`)").into()),
            Error::ParseError(s) => Error::ParseError(format!("{s} (at `{path}`)").into()),
            other => other,
        }
    }
}
