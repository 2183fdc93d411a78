use crate::Compression;
use crate::error::{ErrorKind, Result};
use docset_cache::CacheRef;
use exn::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Decompressed blob files of one docset, loaded on first use.
///
/// Blobs are kept in memory behind a [`RwLock`] once inflated, so a docset
/// whose pages share a few large blobs pays for decompression once per blob
/// rather than once per page.
#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
    compression: Option<Compression>,
    blobs: RwLock<HashMap<i64, Arc<Vec<u8>>>>,
}
impl BlobStore {
    /// A store reading `<root>/<data_id>`, detecting each blob's format.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), compression: None, blobs: RwLock::default() }
    }

    /// Skip detection and decode every blob as `compression`.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blob_path(&self, data_id: i64) -> PathBuf {
        self.root.join(data_id.to_string())
    }

    /// The decompressed contents of blob `data_id`.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&self, data_id: i64) -> Result<Arc<Vec<u8>>> {
        if let Some(blob) = self.blobs.read().await.get(&data_id) {
            return Ok(Arc::clone(blob));
        }
        let path = self.blob_path(data_id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => exn::bail!(ErrorKind::NotFound(path)),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        };
        let compression = self.compression.unwrap_or_else(|| Compression::detect(&raw));
        let data = tokio::task::spawn_blocking(move || compression.decompress(&raw))
            .await
            .or_raise(|| ErrorKind::Io)??;
        tracing::debug!(data_id, %compression, size = data.len(), "loaded blob");
        let mut blobs = self.blobs.write().await;
        // Another task may have loaded the same blob while this one was
        // decompressing; keep whichever landed first.
        let blob = blobs.entry(data_id).or_insert_with(|| Arc::new(data));
        Ok(Arc::clone(blob))
    }

    /// Load every blob in `data_ids`, returning how many are now resident.
    pub async fn preload(&self, data_ids: impl IntoIterator<Item = i64>) -> Result<usize> {
        for data_id in data_ids {
            self.load(data_id).await?;
        }
        Ok(self.blobs.read().await.len())
    }

    /// Copy `[offset, offset + length)` out of decompressed blob `data_id`.
    ///
    /// Ranges that do not fit inside the blob fail with
    /// [`ErrorKind::OutOfBounds`].
    pub async fn slice(&self, data_id: i64, offset: u64, length: u64) -> Result<Vec<u8>> {
        let blob = self.load(data_id).await?;
        let size = blob.len() as u64;
        let out_of_bounds = || ErrorKind::OutOfBounds { data_id, offset, length, size };
        let end = match offset.checked_add(length) {
            Some(end) if end <= size => end,
            _ => exn::bail!(out_of_bounds()),
        };
        let start = usize::try_from(offset).or_raise(out_of_bounds)?;
        let end = usize::try_from(end).or_raise(out_of_bounds)?;
        Ok(blob[start..end].to_vec())
    }

    /// The bytes a cache reference points at.
    pub async fn read(&self, cache_ref: &CacheRef) -> Result<Vec<u8>> {
        self.slice(cache_ref.data_id, cache_ref.offset, cache_ref.length).await
    }

    pub async fn resident(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Drop every decompressed blob.
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }
}
