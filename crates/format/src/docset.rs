//! On-disk layout shared by every docset flavour.

use crate::error::{ErrorKind, Result};
use docset_model::EntryFilters;
use exn::ResultExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::{Path, PathBuf};

const RESOURCES: &str = "Contents/Resources";
const INDEX: &str = "docSet.dsidx";
const DOCUMENTS: &str = "Documents";

/// Well-known locations inside a `.docset` bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsetPaths {
    pub root: PathBuf,
    /// `Contents/Resources/docSet.dsidx`, the SQLite search index.
    pub index: PathBuf,
    /// `Contents/Resources/Documents`, the content root.
    pub documents: PathBuf,
}
impl DocsetPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let resources = root.join(RESOURCES);
        Self { index: resources.join(INDEX), documents: resources.join(DOCUMENTS), root }
    }

    /// Resolve a document-relative path, refusing anything that escapes the
    /// documents directory.
    pub fn document(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir))
            .then(|| self.documents.join(relative))
    }
}

pub(crate) async fn open_index(paths: &DocsetPaths) -> Result<SqlitePool> {
    docset_cache::open_read_only(&paths.index).await.or_raise(|| ErrorKind::Database)
}

pub(crate) async fn has_table(pool: &SqlitePool, table: &str) -> Result<bool> {
    sqlx::query_scalar(include_str!("../queries/has_table.sql"))
        .bind(table)
        .fetch_one(pool)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Side-effect-free detection probe: does the docset index contain `table`?
///
/// Every failure along the way counts as "no".
pub(crate) async fn probe(path: &Path, table: &str) -> bool {
    let paths = DocsetPaths::new(path);
    if !tokio::fs::try_exists(&paths.index).await.unwrap_or(false) {
        return false;
    }
    let Ok(pool) = open_index(&paths).await else {
        return false;
    };
    let found = has_table(&pool, table).await.unwrap_or(false);
    pool.close().await;
    found
}

/// Append `AND <column> IN (…)` for a non-empty set of values.
pub(crate) fn push_in<'a, I>(query: &mut QueryBuilder<'a, Sqlite>, column: &str, values: I)
where
    I: IntoIterator<Item = String>,
{
    let values: Vec<String> = values.into_iter().collect();
    if values.is_empty() {
        return;
    }
    query.push(" AND ").push(column).push(" IN (");
    let mut separated = query.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

/// Append `AND (<column> LIKE ? ESCAPE '\' OR …)`. An empty pattern list
/// matches no rows at all. Literal parts of a pattern go through
/// [`escape_like`].
pub(crate) fn push_any_like(query: &mut QueryBuilder<'_, Sqlite>, column: &str, patterns: Vec<String>) {
    if patterns.is_empty() {
        query.push(" AND 0");
        return;
    }
    query.push(" AND (");
    for (index, pattern) in patterns.into_iter().enumerate() {
        if index > 0 {
            query.push(" OR ");
        }
        query.push(column).push(" LIKE ").push_bind(pattern).push(r" ESCAPE '\'");
    }
    query.push(")");
}

/// Escape `%`, `_` and `\` so `value` only matches itself inside a `LIKE`
/// pattern built for [`push_any_like`].
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Start an entry query; with `count` the rows are counted instead of
/// returned.
///
/// `select` must end in a `WHERE` clause so that filters can be appended
/// with `AND`.
pub(crate) fn begin_entries<'a>(select: &str, count: bool) -> QueryBuilder<'a, Sqlite> {
    let mut query = QueryBuilder::new(if count { "SELECT COUNT(*) FROM (" } else { "" });
    query.push(select);
    query
}

/// Order, limit and (for counts) close an entry query, so that a count
/// honours the same limit as the enumeration.
pub(crate) fn finish_entries(query: &mut QueryBuilder<'_, Sqlite>, filters: &EntryFilters, order_by: &str, count: bool) {
    query.push(" ORDER BY ").push(order_by);
    if let Some(limit) = filters.limit {
        query.push(" LIMIT ").push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    if count {
        query.push(")");
    }
}
