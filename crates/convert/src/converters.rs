//! The three converter strategies.

use crate::error::{ErrorKind, Result};
use crate::layout::{AppleLayout, Layout, StandardLayout};
use crate::strategy::ConverterStrategy;
use async_trait::async_trait;
use docset_format::{DocsetFormat, LinkMap};
use exn::ResultExt;

/// `<type>/<name>.md` output for Standard Dash docsets.
#[derive(Debug)]
pub struct StandardConverter<F> {
    format: F,
    layout: StandardLayout,
}
impl<F: DocsetFormat> StandardConverter<F> {
    pub fn new(format: F) -> Self {
        Self { format, layout: StandardLayout::default() }
    }

    pub fn into_format(self) -> F {
        self.format
    }
}

#[async_trait]
impl<F: DocsetFormat> ConverterStrategy for StandardConverter<F> {
    type Format = F;

    fn format(&self) -> &F {
        &self.format
    }

    fn layout(&self) -> &dyn Layout {
        &self.layout
    }

    fn parts(&mut self) -> (&F, &mut dyn Layout) {
        (&self.format, &mut self.layout)
    }

    async fn reset_index_tracking(&mut self) -> Result<LinkMap> {
        self.layout.reset();
        Ok(LinkMap::default())
    }

    async fn close(&mut self) {
        self.format.close().await;
    }
}

/// The Standard layout for CoreData docsets, whose pages link to each other
/// by source file: every run rebuilds the handler's link map before the
/// first entry is extracted.
#[derive(Debug)]
pub struct CoreDataConverter<F> {
    format: F,
    layout: StandardLayout,
}
impl<F: DocsetFormat> CoreDataConverter<F> {
    pub fn new(format: F) -> Self {
        Self { format, layout: StandardLayout::default() }
    }

    pub fn into_format(self) -> F {
        self.format
    }
}

#[async_trait]
impl<F: DocsetFormat> ConverterStrategy for CoreDataConverter<F> {
    type Format = F;

    fn format(&self) -> &F {
        &self.format
    }

    fn layout(&self) -> &dyn Layout {
        &self.layout
    }

    fn parts(&mut self) -> (&F, &mut dyn Layout) {
        (&self.format, &mut self.layout)
    }

    async fn reset_index_tracking(&mut self) -> Result<LinkMap> {
        self.layout.reset();
        let links = self.format.prepare().await.or_raise(|| ErrorKind::Format)?;
        tracing::debug!(links = links.len(), "link map rebuilt");
        Ok(links)
    }

    async fn close(&mut self) {
        self.format.close().await;
    }
}

/// `<language>/<framework>/…` output for Apple bundles.
#[derive(Debug)]
pub struct AppleConverter<F> {
    format: F,
    layout: AppleLayout,
}
impl<F: DocsetFormat> AppleConverter<F> {
    pub fn new(format: F) -> Self {
        Self { format, layout: AppleLayout::default() }
    }

    pub fn into_format(self) -> F {
        self.format
    }
}

#[async_trait]
impl<F: DocsetFormat> ConverterStrategy for AppleConverter<F> {
    type Format = F;

    fn format(&self) -> &F {
        &self.format
    }

    fn layout(&self) -> &dyn Layout {
        &self.layout
    }

    fn parts(&mut self) -> (&F, &mut dyn Layout) {
        (&self.format, &mut self.layout)
    }

    async fn reset_index_tracking(&mut self) -> Result<LinkMap> {
        self.layout.reset();
        Ok(LinkMap::default())
    }

    async fn close(&mut self) {
        self.format.close().await;
    }
}
