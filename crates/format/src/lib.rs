//! Format handlers for the three docset flavours.
//!
//! Every flavour exposes the same [`DocsetFormat`] contract: detection,
//! a lazy filtered entry stream, an entry count honouring the same filters,
//! and content extraction into [`ParsedContent`](docset_model::ParsedContent).
//!
//! | Handler            | Index                       | Content                               |
//! |--------------------|-----------------------------|---------------------------------------|
//! | [`AppleFormat`]    | `searchIndex` request keys  | `cache.db` ranges of compressed blobs |
//! | [`CoreDataFormat`] | `ZTOKEN` tables             | cross-linked HTML files               |
//! | [`DashFormat`]     | `searchIndex`               | HTML files                            |
//!
//! [`FormatHandler::open`] picks and initialises the right one for a path.

pub mod apple;
mod consts;
mod coredata;
mod dash;
mod docset;
pub mod error;
mod format;
mod handler;
mod html;
mod links;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use crate::apple::AppleFormat;
pub use crate::coredata::CoreDataFormat;
pub use crate::dash::DashFormat;
pub use crate::docset::DocsetPaths;
pub use crate::format::{DocsetFormat, EntryStream};
pub use crate::handler::{FormatHandler, FormatOptions};
pub use crate::links::LinkMap;
