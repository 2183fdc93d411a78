//! Blob Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A blob error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for blob operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The blob file referenced by the cache does not exist.
    #[display("blob not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Data is corrupt or malformed. Don't retry with the same input.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// The requested format is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The cache points outside the decompressed blob.
    #[display("bytes {offset}..+{length} are outside blob {data_id} ({size} bytes)")]
    OutOfBounds { data_id: i64, offset: u64, length: u64, size: u64 },
    /// An I/O operation failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
