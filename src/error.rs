//! Error types for SstLookup.

use std::io;
use thiserror::Error;

/// The result type used throughout SstLookup.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for table decoding and lookups.
///
/// A missing key is never an error: lookups report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// The table file violates the on-disk format.
    ///
    /// Raised for truncated or over-long varints, magic or version
    /// mismatches, files shorter than the footer, and block handles or
    /// entries that point outside their enclosing buffer. Always fatal for
    /// the lookup in progress.
    #[error("Format error: {0}")]
    Format(String),

    /// An I/O error occurred while loading a table file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Creates a new format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true if this error reports a malformed table file.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}
