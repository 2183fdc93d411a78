//! Blob files of cache-backed docsets.
//!
//! Apple-style docsets concatenate page bodies into a handful of compressed
//! files under `Documents/fs/`. A [`CacheRef`](docset_cache::CacheRef) names a
//! byte range of the *decompressed* blob, so every blob has to be inflated
//! once before it can be sliced. This crate provides:
//!
//! - **Format detection** from magic bytes ([`Compression::detect`]), falling
//!   back to Brotli, which has no magic bytes of its own
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`])
//! - **[`BlobStore`]**: a per-docset cache of decompressed blobs with
//!   bounds-checked range reads

mod construct;
pub mod error;
mod ops;
mod store;

pub use crate::store::BlobStore;

/// A supported blob compression format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    None,
    /// Brotli compression, the format Apple bundles ship by default.
    #[default]
    Brotli,
    /// Gzip compression
    Gzip,
    /// Zstd compression
    Zstd,
}

#[cfg(test)]
mod tests {
    use crate::Compression;

    #[test]
    fn compression_default() {
        assert_eq!(Compression::default(), Compression::Brotli);
    }
}
