//! Format-independent models for docset conversion.
//!
//! Every docset flavour (Apple bundle, Standard Dash, CoreData) is read into
//! the same two shapes:
//! - **[`NormalizedEntry`]**: one documentation item as enumerated from the
//!   docset's index, before any content has been read.
//! - **[`ParsedContent`]**: the extracted, semi-structured body of an entry.
//!
//! The crate also owns the two pure string transforms every converter relies
//! on to lay out output files: [`kind`] (type-code normalization) and
//! [`sanitize`] (filesystem-safe path segments), plus the [`layout`] helpers
//! that combine them.

mod content;
mod entry;
mod filters;
pub mod kind;
pub mod layout;
mod sanitize;

pub use crate::content::{ContentItem, Parameter, ParsedContent, Platform, Relationship, TopicSection};
pub use crate::entry::{EntryId, NormalizedEntry};
pub use crate::filters::EntryFilters;
pub use crate::sanitize::{FALLBACK_NAME, MAX_SEGMENT_LENGTH, sanitize};
