//! Read-only connection pool management.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

// One stream cursor plus a handful of point lookups.
const MAX_CONNECTIONS: u32 = 4;

/// Open a pre-built SQLite database without ever writing to it.
///
/// The file must already exist: a missing database is reported as
/// [`ErrorKind::NotFound`] rather than silently created.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub async fn open_read_only(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        // Docsets are shipped as finished artifacts; nothing else writes to
        // them while a conversion runs.
        .immutable(true);
    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .or_raise(|| ErrorKind::Database)
}
