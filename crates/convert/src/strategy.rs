//! The conversion contract and the loop that drives it.

use crate::error::{ErrorKind, Result};
use crate::generator::MarkdownGenerator;
use crate::layout::Layout;
use crate::options::{ConversionOptions, ConversionResult, ProgressFn};
use crate::search::{DATABASE, SearchIndex};
use crate::writer::OutputWriter;
use async_trait::async_trait;
use docset_format::{DocsetFormat, LinkMap};
use docset_model::{NormalizedEntry, ParsedContent};
use exn::ResultExt;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument;

/// One output layout together with the format handler it converts.
///
/// A strategy owns its handler for the whole run and releases it in
/// [`close`](Self::close).
#[async_trait]
pub trait ConverterStrategy: Send + Sync {
    type Format: DocsetFormat;

    fn format(&self) -> &Self::Format;

    fn format_name(&self) -> &'static str {
        self.format().name()
    }

    fn layout(&self) -> &dyn Layout;

    /// The handler and the layout, borrowed at the same time.
    fn parts(&mut self) -> (&Self::Format, &mut dyn Layout);

    /// Forget everything tracked by a previous run and return the link map
    /// entries must be extracted with.
    async fn reset_index_tracking(&mut self) -> Result<LinkMap>;

    /// Absolute output path of an entry.
    fn output_path(&self, entry: &NormalizedEntry, content: &ParsedContent, output_dir: &Path) -> PathBuf {
        output_dir.join(self.layout().relative_path(entry, content))
    }

    /// Write the root and per-category index pages for everything tracked
    /// so far. Returns the number of pages written.
    async fn generate_indexes(&self, generator: &MarkdownGenerator, writer: &mut OutputWriter) -> Result<usize> {
        let pages = self.layout().index_pages();
        for page in &pages {
            let markdown = generator.render_index(page)?;
            writer.write(&page.path, &markdown).await?;
        }
        tracing::debug!(pages = pages.len(), "index pages written");
        Ok(pages.len())
    }

    async fn convert(
        &mut self,
        options: &ConversionOptions,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<ConversionResult> {
        run(self, options, progress).await
    }

    /// Release the format handler.
    async fn close(&mut self);
}

/// A converted page that is yet to be tracked and indexed.
struct Converted {
    relative: PathBuf,
    content: ParsedContent,
}

/// Extract, lay out, render and write a single entry. `Ok(None)` means the
/// entry has no content.
async fn convert_entry<F>(
    format: &F,
    layout: &dyn Layout,
    links: &LinkMap,
    generator: &MarkdownGenerator,
    writer: &mut OutputWriter,
    entry: &NormalizedEntry,
) -> Result<Option<Converted>>
where
    F: DocsetFormat + ?Sized,
{
    let Some(mut content) = format.extract_content(entry, links).await.or_raise(|| ErrorKind::Format)? else {
        return Ok(None);
    };
    let relative = layout.relative_path(entry, &content);
    layout.link_content(&mut content, &relative);
    let markdown = generator.render_entry(&content)?;
    writer.write(&relative, &markdown).await?;
    Ok(Some(Converted { relative, content }))
}

/// Drive one conversion run.
///
/// Entries are handled strictly one after another in enumeration order.
/// Content absence is counted as skipped; extraction, rendering and write
/// failures are counted as failed and the run moves on. Failures of the
/// entry stream, the search database or the index pages abort the run.
#[instrument(skip_all, fields(format = converter.format_name(), output = %options.output_dir.display()))]
pub(crate) async fn run<C>(
    converter: &mut C,
    options: &ConversionOptions,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<ConversionResult>
where
    C: ConverterStrategy + ?Sized,
{
    let started = Instant::now();
    let links = converter.reset_index_tracking().await?;
    let mut writer = OutputWriter::new(&options.output_dir);
    writer.prepare().await?;
    let generator = MarkdownGenerator::new()?;
    let mut index = match options.generate_index {
        true => Some(SearchIndex::create(options.output_dir.join(DATABASE)).await?),
        false => None,
    };

    let total = converter.format().entry_count(&options.filters).await.or_raise(|| ErrorKind::Format)?;
    tracing::info!(total, "converting entries");
    let mut result = ConversionResult::default();
    let (format, layout) = converter.parts();
    let mut entries = format.iterate_entries(&options.filters);
    while let Some(entry) = entries.next().await {
        let entry = entry.or_raise(|| ErrorKind::Format)?;
        result.processed += 1;
        match convert_entry(format, layout, &links, &generator, &mut writer, &entry).await {
            Ok(Some(Converted { relative, content })) => {
                layout.track(&entry, &content, &relative);
                if let Some(index) = index.as_mut() {
                    index.add(&entry, &content, &relative).await?;
                }
                result.successful += 1;
                match options.verbose {
                    true => tracing::info!(entry = %entry.name, path = %relative.display(), "converted"),
                    false => tracing::debug!(entry = %entry.name, path = %relative.display(), "converted"),
                }
            },
            Ok(None) => {
                result.skipped += 1;
                tracing::debug!(entry = %entry.name, "no content; skipped");
            },
            Err(e) => {
                result.failed += 1;
                tracing::warn!(entry = %entry.name, id = %entry.id, error = ?e, "failed to convert entry");
            },
        }
        if let Some(progress) = progress.as_deref_mut() {
            progress(result.processed, total, &entry);
        }
    }
    drop(entries);

    if let Some(index) = index {
        converter.generate_indexes(&generator, &mut writer).await?;
        index.close().await;
        result.index_entries = Some(index.entries());
        if let Some(search) = &options.search {
            result.search_binary = Some(search.build(&options.output_dir, index.path()).await);
        }
    } else if options.search.is_some() {
        tracing::debug!("search binary skipped because indexing is disabled");
    }

    result.stats = writer.stats();
    result.elapsed = started.elapsed();
    tracing::info!(
        processed = result.processed,
        successful = result.successful,
        skipped = result.skipped,
        failed = result.failed,
        elapsed_ms = %result.elapsed_ms(),
        "conversion finished"
    );
    Ok(result)
}
