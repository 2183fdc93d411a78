//! Content-reference resolver for cache-backed docsets.
//!
//! Apple-style docsets do not store one file per page. Page bodies live inside
//! a small number of shared blob files, and a SQLite database (`cache.db`)
//! maps every opaque content identifier to a byte range:
//!
//! ```text
//! refs(uuid, data_id, offset, length)   -- uuid -> bytes [offset, offset+length) of fs/<data_id>
//! metadata(key, value)
//! ```
//!
//! [`CacheReader`] performs lookups over that table. It never writes and never
//! touches the blobs themselves; reading and bounds-checking the bytes is the
//! blob reader's responsibility.

mod db;
pub mod error;
mod models;
mod reader;

pub use crate::db::open_read_only;
pub use crate::models::CacheRef;
pub use crate::reader::CacheReader;
