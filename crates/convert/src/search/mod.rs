//! Search artifacts produced next to the markdown tree.

mod binary;
mod index;

pub use self::binary::{SearchBinary, SearchBinaryOutcome};
pub use self::index::{DATABASE, SearchIndex};
