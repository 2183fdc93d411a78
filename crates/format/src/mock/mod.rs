//! In-memory format handler and on-disk docset fixtures for testing.

pub mod fixtures;

use crate::error::{ErrorKind, Result};
use crate::{DocsetFormat, EntryStream, LinkMap};
use async_stream::stream;
use async_trait::async_trait;
use docset_model::kind::normalize;
use docset_model::layout::standard_relative_path;
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use exn::OptionExt;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What [`MockFormat::extract_content`](DocsetFormat::extract_content)
/// returns for an entry.
#[derive(Debug, Clone)]
pub enum MockContent {
    Present(ParsedContent),
    Absent,
    Fail,
}

/// In-memory format handler for testing.
///
/// Entries are served in insertion order and filters are applied in memory
/// with the same semantics as the real handlers. Ideal for converter tests
/// that need a [`DocsetFormat`] without building a docset on disk.
///
/// # Examples
///
/// ```
/// use docset_format::mock::MockFormat;
/// use docset_model::{NormalizedEntry, ParsedContent};
///
/// let format = MockFormat::default()
///     .with_entry(NormalizedEntry::new(1, "array_map", "func", "array-map.html"), ParsedContent::new("array_map", "Function"))
///     .with_absent_entry(NormalizedEntry::new(2, "array_filter", "func", "array-filter.html"));
/// ```
#[derive(Debug)]
pub struct MockFormat {
    name: &'static str,
    entries: Vec<(NormalizedEntry, MockContent)>,
    links: LinkMap,
    initialized: bool,
    prepared: AtomicUsize,
}
impl Default for MockFormat {
    fn default() -> Self {
        Self {
            name: "Mock",
            entries: Vec::new(),
            links: LinkMap::default(),
            initialized: true,
            prepared: AtomicUsize::new(0),
        }
    }
}
impl MockFormat {
    /// Change the reported format name (and therefore the converter the
    /// registry selects).
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_entry(mut self, entry: NormalizedEntry, content: ParsedContent) -> Self {
        self.entries.push((entry, MockContent::Present(content)));
        self
    }

    pub fn with_absent_entry(mut self, entry: NormalizedEntry) -> Self {
        self.entries.push((entry, MockContent::Absent));
        self
    }

    pub fn with_failing_entry(mut self, entry: NormalizedEntry) -> Self {
        self.entries.push((entry, MockContent::Fail));
        self
    }

    /// The link map [`prepare`](DocsetFormat::prepare) hands out. Entry
    /// descriptions are rewritten through the map they are extracted with.
    pub fn with_links(mut self, links: LinkMap) -> Self {
        self.links = links;
        self
    }

    pub fn uninitialized(mut self) -> Self {
        self.initialized = false;
        self
    }

    /// How many times [`prepare`](DocsetFormat::prepare) has run.
    pub fn prepare_calls(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }

    fn matches(entry: &NormalizedEntry, filters: &EntryFilters) -> bool {
        let types_ok = filters.types.is_empty() || filters.types.iter().any(|t| normalize(t) == entry.canonical_kind());
        let frameworks_ok = filters.frameworks.is_empty()
            || entry.framework.as_ref().is_some_and(|f| filters.frameworks.contains(&f.to_lowercase()));
        let languages_ok = filters.languages.is_empty()
            || entry.language.as_ref().is_some_and(|l| filters.languages.contains(&l.to_lowercase()));
        types_ok && frameworks_ok && languages_ok
    }

    fn filtered<'a>(&'a self, filters: &'a EntryFilters) -> impl Iterator<Item = &'a (NormalizedEntry, MockContent)> {
        let limit = filters.limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        self.entries.iter().filter(|(entry, _)| Self::matches(entry, filters)).take(limit)
    }
}

#[async_trait]
impl DocsetFormat for MockFormat {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn detect(_path: &Path) -> bool {
        false
    }

    async fn initialize(&mut self, _path: &Path) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn entry_count(&self, filters: &EntryFilters) -> Result<u64> {
        if !self.initialized {
            exn::bail!(ErrorKind::NotInitialized);
        }
        Ok(self.filtered(filters).count() as u64)
    }

    fn iterate_entries<'a>(&'a self, filters: &'a EntryFilters) -> EntryStream<'a> {
        Box::pin(stream! {
            if !self.initialized {
                yield Err(exn::Exn::from(ErrorKind::NotInitialized));
                return;
            }
            for (entry, _) in self.filtered(filters) {
                yield Ok(entry.clone());
            }
        })
    }

    async fn prepare(&self) -> Result<LinkMap> {
        self.prepared.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.clone())
    }

    async fn extract_content(&self, entry: &NormalizedEntry, links: &LinkMap) -> Result<Option<ParsedContent>> {
        let (_, content) = self
            .entries
            .iter()
            .find(|(candidate, _)| candidate.id == entry.id)
            .ok_or_raise(|| ErrorKind::InvalidEntry(entry.id.to_string()))?;
        match content {
            MockContent::Present(content) => {
                let mut content = content.clone();
                if let Some(description) = content.description.take() {
                    let output = standard_relative_path(&entry.name, &entry.kind);
                    content.description = Some(links.rewrite(&description, &entry.path, &output));
                }
                Ok(Some(content))
            },
            MockContent::Absent => Ok(None),
            MockContent::Fail => exn::bail!(ErrorKind::InvalidContent(entry.id.to_string())),
        }
    }

    async fn types(&self) -> Result<BTreeSet<String>> {
        Ok(self.entries.iter().map(|(entry, _)| entry.canonical_kind()).collect())
    }

    async fn categories(&self) -> Result<BTreeSet<String>> {
        Ok(self.entries.iter().filter_map(|(entry, _)| entry.framework.clone()).collect())
    }

    fn supports_multiple_languages(&self) -> bool {
        self.entries.iter().filter_map(|(entry, _)| entry.language.as_ref()).collect::<BTreeSet<_>>().len() > 1
    }

    async fn languages(&self) -> Result<Vec<String>> {
        let languages: BTreeSet<String> = self.entries.iter().filter_map(|(entry, _)| entry.language.clone()).collect();
        Ok(languages.into_iter().collect())
    }

    async fn close(&mut self) {
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn fixture() -> MockFormat {
        MockFormat::default()
            .with_entry(NormalizedEntry::new(1, "array_map", "func", "a.html"), ParsedContent::new("array_map", "Function"))
            .with_absent_entry(NormalizedEntry::new(2, "DateTime", "cl", "b.html"))
            .with_failing_entry(NormalizedEntry::new(3, "strlen", "Function", "c.html"))
    }

    #[tokio::test]
    async fn test_filters_and_limit() {
        let format = fixture();
        let filters = EntryFilters::new().with_types(["Function"]);
        assert_eq!(format.entry_count(&filters).await.unwrap(), 2);
        let names: Vec<String> =
            format.iterate_entries(&filters).map_ok(|e| e.name).try_collect().await.unwrap();
        assert_eq!(names, ["array_map", "strlen"]);
        assert_eq!(format.entry_count(&EntryFilters::new().with_limit(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_extract_content_variants() {
        let format = fixture();
        let links = format.prepare().await.unwrap();
        let entries: Vec<NormalizedEntry> = format.iterate_entries(&EntryFilters::default()).try_collect().await.unwrap();
        assert!(format.extract_content(&entries[0], &links).await.unwrap().is_some());
        assert!(format.extract_content(&entries[1], &links).await.unwrap().is_none());
        assert!(format.extract_content(&entries[2], &links).await.is_err());
        assert_eq!(format.prepare_calls(), 1);
    }

    #[tokio::test]
    async fn test_uninitialized_stream_errors() {
        let format = fixture().uninitialized();
        let result: Result<Vec<NormalizedEntry>> = format.iterate_entries(&EntryFilters::default()).try_collect().await;
        assert!(matches!(&*result.unwrap_err(), ErrorKind::NotInitialized));
    }
}
