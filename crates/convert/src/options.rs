use crate::search::{SearchBinary, SearchBinaryOutcome};
use crate::writer::WriteStats;
use docset_model::{EntryFilters, NormalizedEntry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Called once per enumerated entry, in enumeration order, with the number
/// of entries processed so far (including this one) and the expected total.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u64, u64, &NormalizedEntry) + Send);

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub output_dir: PathBuf,
    /// Log every converted entry at `info` instead of `debug`.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub filters: EntryFilters,
    /// Write index pages and `search.db`.
    #[serde(default = "default_generate_index")]
    pub generate_index: bool,
    /// Compile `search.db` into a search executable afterwards. Only runs
    /// when `generate_index` is set.
    #[serde(default)]
    pub search: Option<SearchBinary>,
}

fn default_generate_index() -> bool {
    true
}

impl ConversionOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            verbose: false,
            filters: EntryFilters::default(),
            generate_index: default_generate_index(),
            search: None,
        }
    }

    pub fn with_filters(mut self, filters: EntryFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_generate_index(mut self, generate_index: bool) -> Self {
        self.generate_index = generate_index;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_search(mut self, search: impl Into<Option<SearchBinary>>) -> Self {
        self.search = search.into();
        self
    }
}

/// Summary of one conversion run.
///
/// `processed == successful + skipped + failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub processed: u64,
    pub successful: u64,
    /// Entries without content.
    pub skipped: u64,
    pub failed: u64,
    pub stats: WriteStats,
    pub elapsed: Duration,
    /// Rows written to `search.db`, when indexing ran.
    pub index_entries: Option<u64>,
    pub search_binary: Option<SearchBinaryOutcome>,
}
impl ConversionResult {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// `None` when no search binary step ran.
    pub fn search_binary_built(&self) -> Option<bool> {
        self.search_binary.as_ref().map(SearchBinaryOutcome::is_built)
    }
}
