//! Format Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A format handler error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for format handler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a format handler failure.
///
/// ### Operational Errors
/// - [`ErrorKind::NotADocset`]
/// - [`ErrorKind::NotInitialized`]
/// - [`ErrorKind::InvalidEntry`]
/// - [`ErrorKind::InvalidContent`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Database`]
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::Blob`]
/// - [`ErrorKind::Io`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No known docset layout was found at the path.
    #[display("not a recognised docset: {}", _0.display())]
    NotADocset(#[error(not(source))] PathBuf),
    /// The handler was used before `initialize` or after `close`.
    #[display("format handler is not initialized")]
    NotInitialized,
    /// The entry was not produced by this handler.
    #[display("entry does not belong to this docset: {_0}")]
    InvalidEntry(#[error(not(source))] String),
    /// Stored content could not be decoded.
    #[display("invalid content for entry: {_0}")]
    InvalidContent(#[error(not(source))] String),
    /// The docset index database could not be read.
    #[display("docset index error")]
    Database,
    /// A lookup in the content cache failed.
    #[display("content cache error")]
    Cache,
    /// A blob file could not be read or sliced.
    #[display("blob error")]
    Blob,
    /// A content file could not be read.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
