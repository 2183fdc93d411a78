use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Counters covering every page written during one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    pub files_written: u64,
    pub bytes_written: u64,
    pub directories_created: u64,
}

/// Writes pages below an output directory, creating directories on demand
/// and keeping [`WriteStats`].
///
/// Existing files are overwritten, so the last writer wins when two entries
/// map to the same path.
#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    known: HashSet<PathBuf>,
    stats: WriteStats,
}
impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), known: HashSet::new(), stats: WriteStats::default() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Create the output directory itself.
    pub async fn prepare(&mut self) -> Result<()> {
        let root = self.root.clone();
        self.ensure_dir(&root).await
    }

    /// Write `contents` to `relative` (relative to the output directory),
    /// returning the absolute path.
    pub async fn write(&mut self, relative: &Path, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }
        tokio::fs::write(&path, contents).await.or_raise(|| ErrorKind::Write(path.clone()))?;
        self.stats.files_written += 1;
        self.stats.bytes_written += contents.len() as u64;
        Ok(path)
    }

    async fn ensure_dir(&mut self, dir: &Path) -> Result<()> {
        if self.known.contains(dir) {
            return Ok(());
        }
        let mut missing = 0;
        for ancestor in dir.ancestors() {
            if self.known.contains(ancestor) || tokio::fs::try_exists(ancestor).await.unwrap_or(false) {
                break;
            }
            missing += 1;
        }
        tokio::fs::create_dir_all(dir).await.or_raise(|| ErrorKind::Write(dir.to_path_buf()))?;
        self.stats.directories_created += missing;
        self.known.extend(dir.ancestors().map(Path::to_path_buf));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_counts_files_bytes_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path().join("out"));
        writer.prepare().await.unwrap();
        writer.write(Path::new("function/array_map.md"), "# array_map\n").await.unwrap();
        writer.write(Path::new("function/strlen.md"), "# strlen\n").await.unwrap();
        let written = writer.write(Path::new("swift/uikit/uiview.md"), "# UIView\n").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(written).await.unwrap(), "# UIView\n");
        assert_eq!(
            writer.stats(),
            WriteStats { files_written: 3, bytes_written: 30, directories_created: 4 }
        );
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        writer.prepare().await.unwrap();
        writer.write(Path::new("class/a_b.md"), "first").await.unwrap();
        let path = writer.write(Path::new("class/a_b.md"), "second").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(path).await.unwrap(), "second");
        assert_eq!(writer.stats().files_written, 2);
        assert_eq!(writer.stats().directories_created, 1);
    }

    #[tokio::test]
    async fn test_write_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("blocked"), "a file, not a directory").await.unwrap();
        let mut writer = OutputWriter::new(dir.path());
        let err = writer.write(Path::new("blocked/page.md"), "x").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Write(_)));
    }
}
