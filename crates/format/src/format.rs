use crate::error::Result;
use crate::links::LinkMap;
use async_trait::async_trait;
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use futures::Stream;
use std::collections::BTreeSet;
use std::path::Path;
use std::pin::Pin;

/// A lazy, finite sequence of entries holding a cursor into the docset index.
pub type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<NormalizedEntry>> + Send + 'a>>;

/// Unified interface over the docset flavours.
///
/// A handler exclusively owns its storage handles between [`initialize`]
/// and [`close`]. Entry streams are restartable: every call to
/// [`iterate_entries`] re-scans from the first row.
///
/// Content extraction is a two-phase protocol. [`prepare`] builds whatever
/// cross-entry state the format needs (a [`LinkMap`]) and
/// [`extract_content`] takes that map as an argument, so no content can be
/// extracted before preparation has finished.
///
/// [`initialize`]: DocsetFormat::initialize
/// [`close`]: DocsetFormat::close
/// [`iterate_entries`]: DocsetFormat::iterate_entries
/// [`prepare`]: DocsetFormat::prepare
/// [`extract_content`]: DocsetFormat::extract_content
#[async_trait]
pub trait DocsetFormat: Send + Sync {
    /// Display name, also used to select a converter.
    fn name(&self) -> &'static str;

    /// Probe `path` without modifying anything. Never fails: any error while
    /// probing means "not this format".
    async fn detect(path: &Path) -> bool
    where
        Self: Sized;

    /// Open the docset's storage. Calling it again reopens cleanly.
    async fn initialize(&mut self, path: &Path) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Number of entries [`iterate_entries`](DocsetFormat::iterate_entries)
    /// would yield for the same filters.
    async fn entry_count(&self, filters: &EntryFilters) -> Result<u64>;

    fn iterate_entries<'a>(&'a self, filters: &'a EntryFilters) -> EntryStream<'a>;

    /// Build the cross-entry link map, from scratch, for one conversion run.
    async fn prepare(&self) -> Result<LinkMap> {
        Ok(LinkMap::default())
    }

    /// Resolve an entry's body. `Ok(None)` means the entry has no content,
    /// which is not an error.
    async fn extract_content(&self, entry: &NormalizedEntry, links: &LinkMap) -> Result<Option<ParsedContent>>;

    /// Canonical type names present in the docset.
    async fn types(&self) -> Result<BTreeSet<String>>;

    /// Framework or category names present in the docset.
    async fn categories(&self) -> Result<BTreeSet<String>>;

    fn supports_multiple_languages(&self) -> bool {
        false
    }

    async fn languages(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Release every storage handle. Safe to call when never initialized.
    async fn close(&mut self);
}
