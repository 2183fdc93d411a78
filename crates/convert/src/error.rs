//! Conversion Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a conversion failure.
///
/// Per-entry failures ([`ErrorKind::Format`], [`ErrorKind::Render`],
/// [`ErrorKind::Write`]) are counted and logged by the conversion loop; only
/// failures outside an entry abort a run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The format handler failed to open, enumerate or extract.
    #[display("docset format error")]
    Format,
    /// A template failed to compile or render.
    #[display("template error: {_0}")]
    Render(#[error(not(source))] &'static str),
    /// A file or directory below the output directory could not be written.
    #[display("could not write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// The search database could not be created or written.
    #[display("search index error")]
    SearchIndex,
    /// Search database migrations failed.
    #[display("search index migration error")]
    Migration,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}
