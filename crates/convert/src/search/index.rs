use crate::error::{ErrorKind, Result};
use docset_model::{NormalizedEntry, ParsedContent};
use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// File name of the search database inside the output directory.
pub const DATABASE: &str = "search.db";

/// Embedded migrations, run on every fresh database.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// The `search.db` of one conversion run.
///
/// The database is deleted and recreated by [`create`](Self::create), so it
/// only ever describes the pages of the current run.
#[derive(Debug)]
pub struct SearchIndex {
    pool: SqlitePool,
    path: PathBuf,
    entries: u64,
}
impl SearchIndex {
    #[instrument]
    pub async fn create(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("removed previous search database"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err(e).or_raise(|| ErrorKind::SearchIndex),
        }
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            // A single self-contained file, no WAL side files.
            .journal_mode(SqliteJournalMode::Delete);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::SearchIndex)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        Ok(Self { pool, path, entries: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows inserted so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Index one written page; `relative` is its path inside the output
    /// directory.
    pub async fn add(&mut self, entry: &NormalizedEntry, content: &ParsedContent, relative: &Path) -> Result<()> {
        sqlx::query(include_str!("../../queries/insert_entry.sql"))
            .bind(entry.id.to_string())
            .bind(&entry.name)
            .bind(&content.kind)
            .bind(relative.to_string_lossy().replace('\\', "/"))
            .bind(content.summary.as_deref())
            .bind(content.language.as_deref().or(entry.language.as_deref()))
            .bind(content.framework.as_deref().or(entry.framework.as_deref()))
            .bind(content.description.as_deref())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::SearchIndex)?;
        self.entries += 1;
        Ok(())
    }

    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
