//! Cache Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The cache database does not exist; the docset is incomplete.
    #[display("cache database not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("database error")]
    Database,
    /// A row holds a value that cannot describe a byte range.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
