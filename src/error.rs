//! Error types for the header dictionaries.
//!
//! Only contract-tier failures are represented here: mutating a frozen
//! dictionary, rejecting an illegal value byte, double-adding a value, and
//! malformed Content-Length input. Invariant violations (an unknown bit in the
//! presence word, index collisions in the registry) are bugs in the build-time
//! tables and surface as panics, not as [`HeaderError`] variants.

use thiserror::Error;

/// Errors surfaced by header dictionary operations.
#[derive(Error, Debug)]
pub enum HeaderError {
    /// The dictionary has been frozen and no longer accepts mutation.
    #[error("header dictionary is read-only")]
    ReadOnly,

    /// A header value contained a byte that is illegal under the configured
    /// encoding.
    #[error("invalid byte 0x{byte:02x} at offset {offset} in header value")]
    InvalidValue { byte: u8, offset: usize },

    /// `add` was called for a header that already holds a value.
    #[error("header {name:?} already has a value")]
    ValueAlreadyPresent { name: String },

    /// A Content-Length value was not a plain decimal integer, or was
    /// supplied twice.
    #[error("invalid content-length: {reason}")]
    InvalidContentLength { reason: String },
}

impl HeaderError {
    /// Creates a new InvalidValue error.
    pub fn invalid_value(byte: u8, offset: usize) -> Self {
        Self::InvalidValue { byte, offset }
    }

    /// Creates a new ValueAlreadyPresent error.
    pub fn value_already_present<S: ToString>(name: S) -> Self {
        Self::ValueAlreadyPresent { name: name.to_string() }
    }

    /// Creates a new InvalidContentLength error.
    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }
}
