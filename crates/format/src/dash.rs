//! Standard Dash docsets: a `searchIndex` table pointing at static HTML.

use crate::consts::DASH_ENTRY_MARKER;
use crate::docset::{DocsetPaths, begin_entries, finish_entries, open_index, probe, push_in};
use crate::error::{ErrorKind, Result};
use crate::{DocsetFormat, EntryStream, LinkMap, html};
use async_stream::stream;
use async_trait::async_trait;
use docset_model::kind::normalize;
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::instrument;

const NAME: &str = "Standard Dash";

#[derive(Debug, sqlx::FromRow)]
struct IndexRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    path: String,
}
impl From<IndexRow> for NormalizedEntry {
    fn from(row: IndexRow) -> Self {
        let path = DASH_ENTRY_MARKER.replace_all(&row.path, "").trim().to_string();
        NormalizedEntry::new(row.id, row.name, normalize(&row.kind), path)
    }
}

#[derive(Debug)]
struct State {
    paths: DocsetPaths,
    pool: SqlitePool,
}

/// Reads Standard Dash docsets (`searchIndex` plus HTML documents).
#[derive(Debug, Default)]
pub struct DashFormat {
    state: Option<State>,
}
impl DashFormat {
    /// Display name reported by [`DocsetFormat::name`].
    pub const NAME: &str = NAME;

    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or_raise(|| ErrorKind::NotInitialized)
    }

    fn entries_query<'a>(filters: &EntryFilters, count: bool) -> QueryBuilder<'a, Sqlite> {
        let mut query = begin_entries(include_str!("../queries/dash_entries.sql"), count);
        // Frameworks and languages do not exist in this format.
        push_in(&mut query, "type", filters.type_codes());
        finish_entries(&mut query, filters, "id", count);
        query
    }
}

/// Document-relative file of an index path, or `None` for remote pages.
fn document_file(path: &str) -> Option<&str> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return None;
    }
    let file = path.split(['#', '?']).next().unwrap_or_default();
    (!file.is_empty()).then_some(file)
}

#[async_trait]
impl DocsetFormat for DashFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn detect(path: &Path) -> bool {
        probe(path, "searchIndex").await
    }

    #[instrument(skip(self), fields(format = NAME))]
    async fn initialize(&mut self, path: &Path) -> Result<()> {
        self.close().await;
        let paths = DocsetPaths::new(path);
        let pool = open_index(&paths).await?;
        tracing::debug!(index = %paths.index.display(), "opened docset index");
        self.state = Some(State { paths, pool });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    async fn entry_count(&self, filters: &EntryFilters) -> Result<u64> {
        let state = self.state()?;
        let count: i64 = Self::entries_query(filters, true)
            .build_query_scalar()
            .fetch_one(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn iterate_entries<'a>(&'a self, filters: &'a EntryFilters) -> EntryStream<'a> {
        Box::pin(stream! {
            let state = match self.state() {
                Ok(state) => state,
                Err(err) => {
                    yield Err(err);
                    return;
                },
            };
            let mut query = Self::entries_query(filters, false);
            let mut rows = query.build_query_as::<IndexRow>().fetch(&state.pool);
            while let Some(row) = rows.next().await {
                yield row.map(NormalizedEntry::from).or_raise(|| ErrorKind::Database);
            }
        })
    }

    #[instrument(skip(self, _links), fields(entry = %entry.id))]
    async fn extract_content(&self, entry: &NormalizedEntry, _links: &LinkMap) -> Result<Option<ParsedContent>> {
        let state = self.state()?;
        let Some(file) = document_file(&entry.path) else {
            tracing::debug!(path = entry.path, "no local document");
            return Ok(None);
        };
        let file = state.paths.document(file).ok_or_raise(|| ErrorKind::InvalidEntry(entry.path.clone()))?;
        if !tokio::fs::try_exists(&file).await.unwrap_or(false) {
            tracing::debug!(file = %file.display(), "document missing");
            return Ok(None);
        }
        let bytes = tokio::fs::read(&file).await.or_raise(|| ErrorKind::Io)?;
        let page = html::parse_page(&String::from_utf8_lossy(&bytes));
        let mut content = ParsedContent::new(page.title.unwrap_or_else(|| entry.name.clone()), entry.canonical_kind());
        content.summary = page.summary;
        content.declaration = page.declaration;
        content.description = page.description;
        Ok(Some(content))
    }

    async fn types(&self) -> Result<BTreeSet<String>> {
        let state = self.state()?;
        let types: Vec<String> = sqlx::query_scalar(include_str!("../queries/dash_types.sql"))
            .fetch_all(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(types.iter().map(normalize).collect())
    }

    async fn categories(&self) -> Result<BTreeSet<String>> {
        self.state()?;
        Ok(BTreeSet::new())
    }

    async fn close(&mut self) {
        if let Some(state) = self.state.take() {
            state.pool.close().await;
        }
    }
}
