use crate::error::{ErrorKind, Result};
use crate::{AppleFormat, CoreDataFormat, DashFormat, DocsetFormat, EntryStream, LinkMap};
use async_trait::async_trait;
use exn::OptionExt;
use docset_model::{EntryFilters, NormalizedEntry, ParsedContent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::instrument;

/// Handler settings that only some formats use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Apple: decompress every blob at initialisation.
    pub preload_blobs: bool,
}

/// One of the known docset flavours.
#[derive(Debug)]
pub enum FormatHandler {
    Apple(AppleFormat),
    CoreData(CoreDataFormat),
    Dash(DashFormat),
}

macro_rules! dispatch {
    ($handler:expr, $inner:ident => $body:expr) => {
        match $handler {
            FormatHandler::Apple($inner) => $body,
            FormatHandler::CoreData($inner) => $body,
            FormatHandler::Dash($inner) => $body,
        }
    };
}

impl FormatHandler {
    /// Probe `path` for every known flavour, most specific first: an Apple
    /// bundle also has a `searchIndex`, so it has to win over Standard Dash.
    /// The returned handler is not initialised.
    pub async fn detect(path: &Path, options: &FormatOptions) -> Option<Self> {
        if AppleFormat::detect(path).await {
            return Some(Self::Apple(AppleFormat::new().with_preload_blobs(options.preload_blobs)));
        }
        if CoreDataFormat::detect(path).await {
            return Some(Self::CoreData(CoreDataFormat::new()));
        }
        if DashFormat::detect(path).await {
            return Some(Self::Dash(DashFormat::new()));
        }
        None
    }

    /// Detect and initialise the handler for `path`.
    #[instrument(skip(options))]
    pub async fn open(path: &Path, options: &FormatOptions) -> Result<Self> {
        let mut handler =
            Self::detect(path, options).await.ok_or_raise(|| ErrorKind::NotADocset(path.to_path_buf()))?;
        tracing::info!(format = handler.name(), "detected docset format");
        handler.initialize(path).await?;
        Ok(handler)
    }
}

#[async_trait]
impl DocsetFormat for FormatHandler {
    fn name(&self) -> &'static str {
        dispatch!(self, format => format.name())
    }

    async fn detect(path: &Path) -> bool {
        FormatHandler::detect(path, &FormatOptions::default()).await.is_some()
    }

    async fn initialize(&mut self, path: &Path) -> Result<()> {
        dispatch!(self, format => format.initialize(path).await)
    }

    fn is_initialized(&self) -> bool {
        dispatch!(self, format => format.is_initialized())
    }

    async fn entry_count(&self, filters: &EntryFilters) -> Result<u64> {
        dispatch!(self, format => format.entry_count(filters).await)
    }

    fn iterate_entries<'a>(&'a self, filters: &'a EntryFilters) -> EntryStream<'a> {
        dispatch!(self, format => format.iterate_entries(filters))
    }

    async fn prepare(&self) -> Result<LinkMap> {
        dispatch!(self, format => format.prepare().await)
    }

    async fn extract_content(&self, entry: &NormalizedEntry, links: &LinkMap) -> Result<Option<ParsedContent>> {
        dispatch!(self, format => format.extract_content(entry, links).await)
    }

    async fn types(&self) -> Result<BTreeSet<String>> {
        dispatch!(self, format => format.types().await)
    }

    async fn categories(&self) -> Result<BTreeSet<String>> {
        dispatch!(self, format => format.categories().await)
    }

    fn supports_multiple_languages(&self) -> bool {
        dispatch!(self, format => format.supports_multiple_languages())
    }

    async fn languages(&self) -> Result<Vec<String>> {
        dispatch!(self, format => format.languages().await)
    }

    async fn close(&mut self) {
        dispatch!(self, format => format.close().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::fixtures;

    #[tokio::test]
    async fn test_detection_order() {
        let dir = tempfile::tempdir().unwrap();
        let options = FormatOptions::default();
        let apple = fixtures::apple_docset(dir.path()).await;
        let coredata = fixtures::coredata_docset(dir.path()).await;
        let dash = fixtures::dash_docset(dir.path()).await;
        assert!(matches!(FormatHandler::detect(&apple, &options).await, Some(FormatHandler::Apple(_))));
        assert!(matches!(FormatHandler::detect(&coredata, &options).await, Some(FormatHandler::CoreData(_))));
        assert!(matches!(FormatHandler::detect(&dash, &options).await, Some(FormatHandler::Dash(_))));
        assert!(FormatHandler::detect(dir.path(), &options).await.is_none());
    }

    #[tokio::test]
    async fn test_open() {
        let dir = tempfile::tempdir().unwrap();
        let dash = fixtures::dash_docset(dir.path()).await;
        let mut handler = FormatHandler::open(&dash, &FormatOptions::default()).await.unwrap();
        assert_eq!(handler.name(), "Standard Dash");
        assert!(handler.is_initialized());
        assert_eq!(handler.entry_count(&EntryFilters::default()).await.unwrap(), 4);
        handler.close().await;
        assert!(!handler.is_initialized());

        let err = FormatHandler::open(dir.path(), &FormatOptions::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADocset(_)));
    }
}
