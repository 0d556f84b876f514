/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_sdk_s3::error::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of cache errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No object is stored under the requested key.
    ///
    /// Only ever returned by `get`.
    CacheMiss,

    /// The operation context was cancelled before the storage call completed.
    ///
    /// The outcome of the storage call is unknown: a write or delete may still have taken effect.
    OperationCancelled,

    /// The operation context deadline passed before the storage call completed.
    ///
    /// As with [`ErrorKind::OperationCancelled`] the outcome of the storage call is unknown.
    DeadlineExceeded,

    /// The object store failed the request (transport, auth, permissions, ...).
    ///
    /// The original storage error is available as the [source](std::error::Error::source).
    StorageError,

    /// The object body could not be read
    EncodingError,

    /// The connection string could not be parsed
    InvalidDsn,

    /// Configuration or input validation issues
    InputInvalid,
}

impl Error {
    /// Creates a new cache [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns true if this error reports an absent key rather than a failure.
    pub fn is_cache_miss(&self) -> bool {
        self.kind == ErrorKind::CacheMiss
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::CacheMiss => write!(f, "cache miss"),
            ErrorKind::OperationCancelled => write!(f, "operation cancelled"),
            ErrorKind::DeadlineExceeded => write!(f, "operation deadline exceeded"),
            ErrorKind::StorageError => write!(f, "object storage request failed"),
            ErrorKind::EncodingError => write!(f, "failed to read object body"),
            ErrorKind::InvalidDsn => write!(f, "invalid connection string"),
            ErrorKind::InputInvalid => write!(f, "invalid input"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Self::new(ErrorKind::InvalidDsn, value)
    }
}

static CACHE_MISS_ERROR: &str = "no object stored under the requested key";

pub(crate) fn cache_miss() -> Error {
    Error::new(ErrorKind::CacheMiss, CACHE_MISS_ERROR)
}

static CANCELLATION_ERROR: &str =
    "operation context cancelled, the storage request outcome is unknown";

pub(crate) fn operation_cancelled() -> Error {
    Error::new(ErrorKind::OperationCancelled, CANCELLATION_ERROR)
}

static DEADLINE_ERROR: &str =
    "operation context deadline exceeded, the storage request outcome is unknown";

pub(crate) fn deadline_exceeded() -> Error {
    Error::new(ErrorKind::DeadlineExceeded, DEADLINE_ERROR)
}

pub(crate) fn storage_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::StorageError, err)
}

pub(crate) fn encoding_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::EncodingError, err)
}

pub(crate) fn invalid_dsn<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InvalidDsn, err)
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}
