//! Apple API docsets: a `searchIndex` of request keys, a content cache
//! mapping hashed keys to byte ranges, and compressed blobs holding DocC
//! render JSON.

mod key;
mod render;

pub use self::key::{InvalidKey, LANGUAGES, RequestKey, language_prefix, prefix_language};

use self::render::RenderNode;
use crate::docset::{DocsetPaths, begin_entries, escape_like, finish_entries, open_index, probe, push_any_like, push_in};
use crate::error::{ErrorKind, Result};
use crate::{DocsetFormat, EntryStream, LinkMap};
use async_stream::stream;
use async_trait::async_trait;
use docset_blob::BlobStore;
use docset_cache::CacheReader;
use docset_model::kind::normalize;
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

const NAME: &str = "Apple";
const CACHE_DB: &str = "cache.db";
const BLOB_DIR: &str = "fs";

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
        match RequestKey::from_index_path(&row.path) {
            Some(key) => NormalizedEntry::new(row.id, row.name, normalize(&row.kind), key.to_string())
                .with_language(key.language().map(str::to_string))
                .with_framework(key.framework()),
            // Kept so that counts and enumeration agree; extraction reports it.
            None => NormalizedEntry::new(row.id, row.name, normalize(&row.kind), row.path),
        }
    }
}

#[derive(Debug)]
struct State {
    pool: SqlitePool,
    cache: CacheReader,
    blobs: BlobStore,
}

fn cache_path(paths: &DocsetPaths) -> PathBuf {
    paths.documents.join(CACHE_DB)
}

/// Reads Apple API documentation bundles.
#[derive(Debug, Default)]
pub struct AppleFormat {
    preload_blobs: bool,
    state: Option<State>,
}
impl AppleFormat {
    /// Display name reported by [`DocsetFormat::name`].
    pub const NAME: &str = NAME;

    pub fn new() -> Self {
        Self::default()
    }

    /// Decompress every blob referenced by the cache during
    /// [`initialize`](DocsetFormat::initialize) instead of on first use.
    pub fn with_preload_blobs(mut self, preload: bool) -> Self {
        self.preload_blobs = preload;
        self
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or_raise(|| ErrorKind::NotInitialized)
    }

    fn entries_query<'a>(filters: &EntryFilters, count: bool) -> QueryBuilder<'a, Sqlite> {
        let mut query = begin_entries(include_str!("../../queries/apple_entries.sql"), count);
        push_in(&mut query, "type", filters.type_codes());
        if !filters.languages.is_empty() {
            let patterns = filters
                .languages
                .iter()
                .filter_map(|language| language_prefix(language))
                .map(|prefix| format!("%request_key={prefix}/%"))
                .collect();
            push_any_like(&mut query, "path", patterns);
        }
        if !filters.frameworks.is_empty() {
            // Root page or descendants, whatever follows the key in the URL.
            let patterns = filters
                .frameworks
                .iter()
                .flat_map(|framework| {
                    let base = format!("%request_key=__/documentation/{}", escape_like(&framework.to_lowercase()));
                    [format!("{base}/%"), format!("{base}&%"), format!("{base}#%"), base]
                })
                .collect();
            push_any_like(&mut query, "LOWER(path)", patterns);
        }
        finish_entries(&mut query, filters, "id", count);
        query
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        let state = self.state()?;
        let paths: Vec<String> = sqlx::query_scalar(include_str!("../../queries/apple_paths.sql"))
            .fetch_all(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(paths.iter().filter_map(|path| RequestKey::from_index_path(path)).collect())
    }
}

#[async_trait]
impl DocsetFormat for AppleFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn detect(path: &Path) -> bool {
        let paths = DocsetPaths::new(path);
        tokio::fs::try_exists(cache_path(&paths)).await.unwrap_or(false) && probe(path, "searchIndex").await
    }

    #[instrument(skip(self), fields(format = NAME, preload = self.preload_blobs))]
    async fn initialize(&mut self, path: &Path) -> Result<()> {
        self.close().await;
        let paths = DocsetPaths::new(path);
        let pool = open_index(&paths).await?;
        let cache = CacheReader::open(cache_path(&paths)).await.or_raise(|| ErrorKind::Cache)?;
        let blobs = BlobStore::new(paths.documents.join(BLOB_DIR));
        if self.preload_blobs {
            let ids = cache.list_blob_ids().await.or_raise(|| ErrorKind::Cache)?;
            let loaded = blobs.preload(ids).await.or_raise(|| ErrorKind::Blob)?;
            tracing::debug!(loaded, "preloaded blobs");
        }
        self.state = Some(State { pool, cache, blobs });
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

    #[instrument(skip(self, _links), fields(entry = %entry.id, key = entry.path))]
    async fn extract_content(&self, entry: &NormalizedEntry, _links: &LinkMap) -> Result<Option<ParsedContent>> {
        let state = self.state()?;
        let key = entry.path.parse::<RequestKey>().or_raise(|| ErrorKind::InvalidEntry(entry.path.clone()))?;
        let uuid = key.cache_uuid();
        let Some(reference) = state.cache.get(&uuid).await.or_raise(|| ErrorKind::Cache)? else {
            tracing::debug!(uuid, "no cache reference");
            return Ok(None);
        };
        let bytes = state.blobs.read(&reference).await.or_raise(|| ErrorKind::Blob)?;
        let node = RenderNode::from_slice(&bytes).or_raise(|| ErrorKind::InvalidContent(key.to_string()))?;

        let title = node.title().map_or_else(|| entry.name.clone(), str::to_string);
        let kind = node.kind().map_or_else(|| entry.canonical_kind(), str::to_string);
        let framework = node.module().map(str::to_string).or_else(|| entry.framework.clone());
        let mut content = ParsedContent::new(title, kind);
        content.language = key.language().map(str::to_string);
        content.framework = framework;
        Ok(Some(node.into_content(content)))
    }

    async fn types(&self) -> Result<BTreeSet<String>> {
        let state = self.state()?;
        let types: Vec<String> = sqlx::query_scalar(include_str!("../../queries/apple_types.sql"))
            .fetch_all(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(types.iter().map(normalize).collect())
    }

    async fn categories(&self) -> Result<BTreeSet<String>> {
        Ok(self.keys().await?.iter().filter_map(RequestKey::framework).collect())
    }

    fn supports_multiple_languages(&self) -> bool {
        true
    }

    async fn languages(&self) -> Result<Vec<String>> {
        let languages: BTreeSet<&str> = self.keys().await?.iter().filter_map(RequestKey::language).collect();
        Ok(languages.into_iter().map(str::to_string).collect())
    }

    async fn close(&mut self) {
        if let Some(state) = self.state.take() {
            state.cache.close().await;
            state.pool.close().await;
            state.blobs.clear().await;
        }
    }
}
