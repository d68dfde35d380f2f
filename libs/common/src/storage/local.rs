//! Working-tree storage for development

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use super::{StorageBackend, normalize_path};
use crate::error::{StorageError, StorageResult};

/// Applies every change to the filesystem immediately
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    settle_delay: Duration,
}

impl LocalStorage {
    /// Create a local storage rooted at `root`
    pub fn new(root: impl Into<PathBuf>, settle_delay: Duration) -> Self {
        Self {
            root: root.into(),
            settle_delay,
        }
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let path = normalize_path(path)?;
        Ok(self.root.join(path))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn read(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        let full = self.resolve(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&full, e)),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;
        match fs::metadata(&full).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&full, e)),
        }
    }

    async fn list(&self, dir: &str) -> StorageResult<Vec<String>> {
        let full = self.resolve(dir)?;
        let mut entries = match fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&full, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&full, e))? {
            let file_type = entry.file_type().await.map_err(|e| io_error(&full, e))?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        Ok(names)
    }

    async fn stage_or_write(&mut self, path: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        debug!("Writing {} ({} bytes)", full.display(), bytes.len());
        fs::write(&full, bytes).await.map_err(|e| io_error(&full, e))
    }

    async fn stage_or_delete(&mut self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        debug!("Deleting {}", full.display());
        fs::remove_file(&full).await.map_err(|e| io_error(&full, e))
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    async fn publish(&mut self, message: &str) -> StorageResult<Option<String>> {
        info!("Local storage changes applied: {}", message);
        Ok(None)
    }

    fn pending(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() -> StorageResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage(&dir);

        storage
            .stage_or_write("public/images/portraits/sunset.webp", b"webp".to_vec())
            .await?;

        let on_disk = std::fs::read(dir.path().join("public/images/portraits/sunset.webp")).unwrap();
        assert_eq!(on_disk, b"webp");
        assert_eq!(storage.pending(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_file_is_none() -> StorageResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        assert_eq!(storage.read("src/content/film/missing.md").await?, None);
        assert!(!storage.exists("src/content/film/missing.md").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_returns_sorted_file_names() -> StorageResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage(&dir);

        storage.stage_or_write("content/b.md", b"b".to_vec()).await?;
        storage.stage_or_write("content/a.md", b"a".to_vec()).await?;
        storage.stage_or_write("content/nested/c.md", b"c".to_vec()).await?;

        assert_eq!(storage.list("content").await?, vec!["a.md", "b.md"]);
        assert!(storage.list("nothing-here").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage(&dir);

        let result = storage.stage_or_delete("content/ghost.md").await;
        assert!(matches!(result, Err(StorageError::Io { .. })));
    }

    #[tokio::test]
    async fn test_publish_is_a_no_op() -> StorageResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage(&dir);

        storage.stage_or_write("content/a.md", b"a".to_vec()).await?;
        assert_eq!(storage.publish("Upload 1 file(s)").await?, None);
        assert!(dir.path().join("content/a.md").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = storage(&dir);

        let result = storage
            .stage_or_write("../escape.txt", b"nope".to_vec())
            .await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }
}
