//! Docset to markdown conversion.
//!
//! A [`ConverterStrategy`] owns a format handler and an output layout. Its
//! [`convert`](ConverterStrategy::convert) runs entries through the same
//! pipeline for every layout:
//!
//! 1. reset tracking (CoreData rebuilds its link map here),
//! 2. stream entries in enumeration order and extract their content,
//! 3. render each page with [`MarkdownGenerator`] and write it below the
//!    output directory,
//! 4. write index pages and `search.db`, then optionally build a search
//!    executable from it.
//!
//! [`convert_docset`] does all of the above for a path, picking the handler
//! and strategy automatically.

mod converters;
pub mod error;
mod generator;
mod layout;
mod options;
mod registry;
pub mod search;
mod strategy;
mod writer;

pub use crate::converters::{AppleConverter, CoreDataConverter, StandardConverter};
pub use crate::generator::{IndexLink, IndexPage, IndexSection, MarkdownGenerator};
pub use crate::layout::{AppleLayout, Layout, StandardLayout};
pub use crate::options::{ConversionOptions, ConversionResult, ProgressFn};
pub use crate::registry::{AnyConverter, ConverterKind, convert_docset, converter_for};
pub use crate::strategy::ConverterStrategy;
pub use crate::writer::{OutputWriter, WriteStats};
