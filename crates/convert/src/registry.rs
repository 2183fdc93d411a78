//! Picks the converter strategy for a format handler.

use crate::converters::{AppleConverter, CoreDataConverter, StandardConverter};
use crate::error::{ErrorKind, Result};
use crate::generator::MarkdownGenerator;
use crate::layout::Layout;
use crate::options::{ConversionOptions, ConversionResult, ProgressFn};
use crate::strategy::ConverterStrategy;
use crate::writer::OutputWriter;
use async_trait::async_trait;
use derive_more::Display;
use docset_format::{AppleFormat, CoreDataFormat, DashFormat, DocsetFormat, FormatHandler, FormatOptions, LinkMap};
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// The known converter strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConverterKind {
    #[display("Apple")]
    Apple,
    #[display("CoreData")]
    CoreData,
    #[display("Standard Dash")]
    Standard,
}
impl ConverterKind {
    /// Strategy for a format's display name. Unknown names get the Standard
    /// Dash strategy.
    pub fn select(format_name: &str) -> Self {
        match format_name {
            name if name == AppleFormat::NAME => Self::Apple,
            name if name == CoreDataFormat::NAME => Self::CoreData,
            name if name == DashFormat::NAME => Self::Standard,
            name => {
                tracing::debug!(format = name, "no dedicated converter; using Standard Dash");
                Self::Standard
            },
        }
    }
}

/// Any of the converter strategies, chosen from the format's name.
#[derive(Debug)]
pub enum AnyConverter<F> {
    Apple(AppleConverter<F>),
    CoreData(CoreDataConverter<F>),
    Standard(StandardConverter<F>),
}

macro_rules! dispatch {
    ($converter:expr, $inner:ident => $body:expr) => {
        match $converter {
            AnyConverter::Apple($inner) => $body,
            AnyConverter::CoreData($inner) => $body,
            AnyConverter::Standard($inner) => $body,
        }
    };
}

impl<F: DocsetFormat> AnyConverter<F> {
    pub fn new(format: F) -> Self {
        match ConverterKind::select(format.name()) {
            ConverterKind::Apple => Self::Apple(AppleConverter::new(format)),
            ConverterKind::CoreData => Self::CoreData(CoreDataConverter::new(format)),
            ConverterKind::Standard => Self::Standard(StandardConverter::new(format)),
        }
    }

    pub fn kind(&self) -> ConverterKind {
        match self {
            Self::Apple(_) => ConverterKind::Apple,
            Self::CoreData(_) => ConverterKind::CoreData,
            Self::Standard(_) => ConverterKind::Standard,
        }
    }

    pub fn into_format(self) -> F {
        dispatch!(self, converter => converter.into_format())
    }
}

#[async_trait]
impl<F: DocsetFormat> ConverterStrategy for AnyConverter<F> {
    type Format = F;

    fn format(&self) -> &F {
        dispatch!(self, converter => converter.format())
    }

    fn layout(&self) -> &dyn Layout {
        dispatch!(self, converter => converter.layout())
    }

    fn parts(&mut self) -> (&F, &mut dyn Layout) {
        dispatch!(self, converter => converter.parts())
    }

    async fn reset_index_tracking(&mut self) -> Result<LinkMap> {
        dispatch!(self, converter => converter.reset_index_tracking().await)
    }

    async fn generate_indexes(&self, generator: &MarkdownGenerator, writer: &mut OutputWriter) -> Result<usize> {
        dispatch!(self, converter => converter.generate_indexes(generator, writer).await)
    }

    async fn close(&mut self) {
        dispatch!(self, converter => converter.close().await)
    }
}

/// The converter for an opened docset.
pub fn converter_for(handler: FormatHandler) -> AnyConverter<FormatHandler> {
    AnyConverter::new(handler)
}

/// Detect, open and convert the docset at `path`.
///
/// The format handler is closed whether or not the conversion succeeds.
#[instrument(skip(options, format_options, progress))]
pub async fn convert_docset(
    path: &Path,
    options: &ConversionOptions,
    format_options: &FormatOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<ConversionResult> {
    let handler = FormatHandler::open(path, format_options).await.or_raise(|| ErrorKind::Format)?;
    let mut converter = converter_for(handler);
    tracing::info!(converter = %converter.kind(), "converting docset");
    let result = converter.convert(options, progress).await;
    converter.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use docset_format::mock::MockFormat;
    use rstest::rstest;

    #[rstest]
    #[case("Apple", ConverterKind::Apple)]
    #[case("CoreData", ConverterKind::CoreData)]
    #[case("Standard Dash", ConverterKind::Standard)]
    #[case("Mock", ConverterKind::Standard)]
    #[case("", ConverterKind::Standard)]
    fn test_select(#[case] name: &str, #[case] expected: ConverterKind) {
        assert_eq!(ConverterKind::select(name), expected);
    }

    #[test]
    fn test_any_converter_follows_format_name() {
        assert_eq!(AnyConverter::new(MockFormat::default().with_name("Apple")).kind(), ConverterKind::Apple);
        assert_eq!(AnyConverter::new(MockFormat::default().with_name("CoreData")).kind(), ConverterKind::CoreData);
        assert_eq!(AnyConverter::new(MockFormat::default()).kind(), ConverterKind::Standard);
    }

    #[tokio::test]
    async fn test_convert_docset_rejects_non_docsets() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConversionOptions::new(dir.path().join("out"));
        let err = convert_docset(dir.path(), &options, &FormatOptions::default(), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Format));
    }
}
