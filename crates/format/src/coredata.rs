//! CoreData docsets: Xcode-era `ZTOKEN` tables pointing at HTML files that
//! link to each other by path.

use crate::docset::{DocsetPaths, begin_entries, finish_entries, has_table, open_index, probe, push_in};
use crate::error::{ErrorKind, Result};
use crate::{DocsetFormat, EntryStream, LinkMap, html};
use async_stream::stream;
use async_trait::async_trait;
use docset_model::kind::normalize;
use docset_model::layout::standard_relative_path;
use docset_model::{EntryFilters, EntryId, NormalizedEntry, ParsedContent};
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::instrument;

const NAME: &str = "CoreData";
const LANGUAGE_TABLE: &str = "ZAPILANGUAGE";

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    file: Option<String>,
    anchor: Option<String>,
    language: Option<String>,
}
impl TokenRow {
    /// `file#anchor`, the bare file, or nothing when the token has no file.
    fn source(&self) -> String {
        match (self.file.as_deref(), self.anchor.as_deref().filter(|a| !a.is_empty())) {
            (Some(file), Some(anchor)) => format!("{file}#{anchor}"),
            (Some(file), None) => file.to_string(),
            (None, _) => String::new(),
        }
    }
}
impl From<TokenRow> for NormalizedEntry {
    fn from(row: TokenRow) -> Self {
        let path = row.source();
        NormalizedEntry::new(row.id, row.name, normalize(&row.kind), path).with_language(row.language)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MetadataRow {
    file: Option<String>,
    declaration: Option<String>,
    #[sqlx(rename = "abstract")]
    summary: Option<String>,
    deprecation: Option<String>,
}

#[derive(Debug)]
struct State {
    paths: DocsetPaths,
    pool: SqlitePool,
    has_language: bool,
}

/// Reads CoreData docsets.
///
/// Pages link to each other by source file path, so [`prepare`] maps every
/// file (and `file#anchor`) to the output page of the first token documented
/// there before any content is extracted.
///
/// [`prepare`]: DocsetFormat::prepare
#[derive(Debug, Default)]
pub struct CoreDataFormat {
    state: Option<State>,
}
impl CoreDataFormat {
    /// Display name reported by [`DocsetFormat::name`].
    pub const NAME: &str = NAME;

    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or_raise(|| ErrorKind::NotInitialized)
    }

    fn entries_query<'a>(state: &State, filters: &EntryFilters, count: bool) -> QueryBuilder<'a, Sqlite> {
        let select = match state.has_language {
            true => include_str!("../queries/coredata_entries_language.sql"),
            false => include_str!("../queries/coredata_entries.sql"),
        };
        let mut query = begin_entries(select, count);
        push_in(&mut query, "ty.ZTYPENAME", filters.type_codes());
        // Without a language table every token is language-less and the
        // filter cannot apply.
        if state.has_language {
            push_in(&mut query, "LOWER(l.ZFULLNAME)", filters.languages.iter().map(|l| l.to_lowercase()));
        }
        finish_entries(&mut query, filters, "t.Z_PK", count);
        query
    }
}

#[async_trait]
impl DocsetFormat for CoreDataFormat {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn detect(path: &Path) -> bool {
        probe(path, "ZTOKEN").await
    }

    #[instrument(skip(self), fields(format = NAME))]
    async fn initialize(&mut self, path: &Path) -> Result<()> {
        self.close().await;
        let paths = DocsetPaths::new(path);
        let pool = open_index(&paths).await?;
        let has_language = has_table(&pool, LANGUAGE_TABLE).await?;
        tracing::debug!(index = %paths.index.display(), has_language, "opened docset index");
        self.state = Some(State { paths, pool, has_language });
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    async fn entry_count(&self, filters: &EntryFilters) -> Result<u64> {
        let state = self.state()?;
        let count: i64 = Self::entries_query(state, filters, true)
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
            let mut query = Self::entries_query(state, filters, false);
            let mut rows = query.build_query_as::<TokenRow>().fetch(&state.pool);
            while let Some(row) = rows.next().await {
                yield row.map(NormalizedEntry::from).or_raise(|| ErrorKind::Database);
            }
        })
    }

    #[instrument(skip(self))]
    async fn prepare(&self) -> Result<LinkMap> {
        let state = self.state()?;
        let filters = EntryFilters::default();
        let mut query = Self::entries_query(state, &filters, false);
        let mut rows = query.build_query_as::<TokenRow>().fetch(&state.pool);
        let mut links = LinkMap::new();
        while let Some(row) = rows.next().await {
            let row = row.or_raise(|| ErrorKind::Database)?;
            let Some(file) = row.file.as_deref() else {
                continue;
            };
            let output = standard_relative_path(&row.name, normalize(&row.kind));
            links.insert(file, output.clone());
            if row.anchor.as_deref().is_some_and(|a| !a.is_empty()) {
                links.insert(row.source(), output);
            }
        }
        tracing::debug!(links = links.len(), "built link map");
        Ok(links)
    }

    #[instrument(skip(self, links), fields(entry = %entry.id))]
    async fn extract_content(&self, entry: &NormalizedEntry, links: &LinkMap) -> Result<Option<ParsedContent>> {
        let state = self.state()?;
        let EntryId::Int(token) = entry.id else {
            exn::bail!(ErrorKind::InvalidEntry(entry.id.to_string()));
        };
        let metadata: Option<MetadataRow> = sqlx::query_as(include_str!("../queries/coredata_metadata.sql"))
            .bind(token)
            .fetch_optional(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;

        let file = metadata.as_ref().and_then(|m| m.file.clone());
        let document = match file.as_deref().and_then(|f| state.paths.document(f)) {
            Some(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => {
                let bytes = tokio::fs::read(&path).await.or_raise(|| ErrorKind::Io)?;
                Some(String::from_utf8_lossy(&bytes).into_owned())
            },
            _ => None,
        };
        let Some(metadata) = metadata else {
            tracing::debug!("token has no metadata");
            return Ok(None);
        };

        let mut content = ParsedContent::new(entry.name.clone(), entry.canonical_kind());
        content.language = entry.language.clone();
        content.declaration = metadata.declaration.as_deref().and_then(html::text);
        content.summary = metadata.summary.as_deref().and_then(html::text);
        content.deprecated = metadata.deprecation.as_deref().and_then(html::text).is_some();
        if let (Some(document), Some(file)) = (document, file) {
            let page = html::parse_page(&document);
            let output = standard_relative_path(&entry.name, &entry.kind);
            content.summary = content.summary.or(page.summary);
            content.declaration = content.declaration.or(page.declaration);
            content.description = page.description.map(|markdown| links.rewrite(&markdown, &file, &output));
        }
        Ok(Some(content))
    }

    async fn types(&self) -> Result<BTreeSet<String>> {
        let state = self.state()?;
        let types: Vec<String> = sqlx::query_scalar(include_str!("../queries/coredata_types.sql"))
            .fetch_all(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(types.iter().map(normalize).collect())
    }

    async fn categories(&self) -> Result<BTreeSet<String>> {
        self.state()?;
        Ok(BTreeSet::new())
    }

    fn supports_multiple_languages(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.has_language)
    }

    async fn languages(&self) -> Result<Vec<String>> {
        let state = self.state()?;
        if !state.has_language {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(include_str!("../queries/coredata_languages.sql"))
            .fetch_all(&state.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    async fn close(&mut self) {
        if let Some(state) = self.state.take() {
            state.pool.close().await;
        }
    }
}
