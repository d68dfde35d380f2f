//! Remote storage that lands each operation as a single Git commit

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{StagedChange, StagedFile, StorageBackend, normalize_path};
use crate::error::{GitHostError, PublishStep, StorageError, StorageResult};
use crate::git::{GitHost, RemoteContent, TreeChange};

/// Stages changes in memory and publishes them as one commit
pub struct RemoteStorage {
    host: Arc<dyn GitHost>,
    branch: String,
    staged: Vec<StagedFile>,
}

impl RemoteStorage {
    /// Create a remote storage publishing to `branch`
    pub fn new(host: Arc<dyn GitHost>, branch: impl Into<String>) -> Self {
        Self {
            host,
            branch: branch.into(),
            staged: Vec::new(),
        }
    }

    fn stage(&mut self, path: &str, change: StagedChange) -> StorageResult<()> {
        let path = normalize_path(path)?;
        // A later change to the same path replaces the earlier one
        self.staged.retain(|file| file.path != path);
        self.staged.push(StagedFile { path, change });
        Ok(())
    }

    /// Run the six-step publish sequence.
    ///
    /// Only the final reference update is visible to readers of the branch,
    /// so an error at any earlier step leaves the branch untouched.
    async fn commit_staged(&self, message: &str) -> StorageResult<String> {
        let at = |step: PublishStep| {
            move |source: GitHostError| StorageError::Publish { step, source }
        };

        let head = self
            .host
            .get_ref(&self.branch)
            .await
            .map_err(at(PublishStep::ReadHead))?;
        debug!("Branch {} is at {}", self.branch, head);

        let base_tree = self
            .host
            .get_commit_tree(&head)
            .await
            .map_err(at(PublishStep::ReadCommit))?;

        let mut changes = Vec::with_capacity(self.staged.len());
        for file in &self.staged {
            let blob = match &file.change {
                StagedChange::Write(bytes) => Some(
                    self.host
                        .create_blob(bytes)
                        .await
                        .map_err(at(PublishStep::CreateBlob))?,
                ),
                StagedChange::Delete => None,
            };
            changes.push(TreeChange {
                path: file.path.clone(),
                blob,
            });
        }

        let tree = self
            .host
            .create_tree(&base_tree, &changes)
            .await
            .map_err(at(PublishStep::CreateTree))?;

        let commit = self
            .host
            .create_commit(message, &tree, &head)
            .await
            .map_err(at(PublishStep::CreateCommit))?;

        self.host
            .update_ref(&self.branch, &commit)
            .await
            .map_err(at(PublishStep::UpdateRef))?;

        Ok(commit)
    }
}

#[async_trait]
impl StorageBackend for RemoteStorage {
    async fn read(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = normalize_path(path)?;
        match self.host.get_content(&path, &self.branch).await? {
            Some(RemoteContent::File(bytes)) => Ok(Some(bytes)),
            Some(RemoteContent::Directory(_)) | None => Ok(None),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = normalize_path(path)?;
        Ok(self.host.file_exists(&path, &self.branch).await?)
    }

    async fn list(&self, dir: &str) -> StorageResult<Vec<String>> {
        let dir = normalize_path(dir)?;
        match self.host.get_content(&dir, &self.branch).await? {
            Some(RemoteContent::Directory(mut names)) => {
                names.sort();
                Ok(names)
            }
            Some(RemoteContent::File(_)) | None => Ok(Vec::new()),
        }
    }

    async fn stage_or_write(&mut self, path: &str, bytes: Vec<u8>) -> StorageResult<()> {
        self.stage(path, StagedChange::Write(bytes))
    }

    async fn stage_or_delete(&mut self, path: &str) -> StorageResult<()> {
        self.stage(path, StagedChange::Delete)
    }

    async fn settle(&self) {}

    async fn publish(&mut self, message: &str) -> StorageResult<Option<String>> {
        if self.staged.is_empty() {
            debug!("Nothing staged, skipping publish");
            return Ok(None);
        }

        info!(
            "Publishing {} staged change(s) to {}: {}",
            self.staged.len(),
            self.branch,
            message
        );

        match self.commit_staged(message).await {
            Ok(commit) => {
                info!("Published commit {} to {}", commit, self.branch);
                self.staged.clear();
                Ok(Some(commit))
            }
            Err(e) => {
                error!("Failed to publish to {}: {}", self.branch, e);
                Err(e)
            }
        }
    }

    fn pending(&self) -> usize {
        self.staged.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::InMemoryGitHost;

    async fn seeded_host() -> Arc<InMemoryGitHost> {
        let host = Arc::new(InMemoryGitHost::new("main"));
        host.seed(
            "main",
            &[
                ("src/content/portraits/old.md", b"old".as_slice()),
                ("public/images/portraits/old.webp", b"old-webp".as_slice()),
            ],
        )
        .await;
        host
    }

    fn stage_batch_changes() -> Vec<(&'static str, Option<&'static [u8]>)> {
        vec![
            ("src/content/portraits/sunset.md", Some(b"record".as_slice())),
            ("public/images/portraits/sunset.webp", Some(b"webp".as_slice())),
            ("public/images/portraits/old.webp", None),
        ]
    }

    async fn stage_all(storage: &mut RemoteStorage) -> StorageResult<()> {
        for (path, content) in stage_batch_changes() {
            match content {
                Some(bytes) => storage.stage_or_write(path, bytes.to_vec()).await?,
                None => storage.stage_or_delete(path).await?,
            }
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_lands_all_changes_in_one_commit() -> StorageResult<()> {
        let host = seeded_host().await;
        let before = host.commit_count("main").await;
        let mut storage = RemoteStorage::new(host.clone(), "main");

        stage_all(&mut storage).await?;
        assert_eq!(storage.pending(), 3);

        let commit = storage.publish("Upload 1 file(s) to portraits").await?;

        assert_eq!(commit, host.head("main").await);
        assert_eq!(host.commit_count("main").await, before + 1);
        assert_eq!(
            host.file("main", "src/content/portraits/sunset.md").await,
            Some(b"record".to_vec())
        );
        assert_eq!(
            host.file("main", "public/images/portraits/sunset.webp").await,
            Some(b"webp".to_vec())
        );
        assert_eq!(host.file("main", "public/images/portraits/old.webp").await, None);
        assert_eq!(storage.pending(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_at_any_step_leaves_branch_untouched() -> StorageResult<()> {
        for failing in PublishStep::ALL {
            let host = seeded_host().await;
            let head_before = host.head("main").await;
            let files_before = host.files("main").await;
            host.fail_at(Some(failing)).await;

            let mut storage = RemoteStorage::new(host.clone(), "main");
            stage_all(&mut storage).await?;

            match storage.publish("Upload").await {
                Err(StorageError::Publish { step, .. }) => assert_eq!(step, failing),
                other => panic!("expected failure at {failing}, got {other:?}"),
            }

            assert_eq!(host.head("main").await, head_before, "head moved at {failing}");
            assert_eq!(host.files("main").await, files_before, "files changed at {failing}");
            assert_eq!(storage.pending(), 3, "staging lost at {failing}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_later_change_to_same_path_wins() -> StorageResult<()> {
        let host = seeded_host().await;
        let mut storage = RemoteStorage::new(host.clone(), "main");

        storage
            .stage_or_write("src/content/portraits/old.md", b"new".to_vec())
            .await?;
        storage.stage_or_delete("src/content/portraits/old.md").await?;

        assert_eq!(storage.pending(), 1);
        storage.publish("Delete old").await?;
        assert_eq!(host.file("main", "src/content/portraits/old.md").await, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_without_changes_creates_no_commit() -> StorageResult<()> {
        let host = seeded_host().await;
        let before = host.commit_count("main").await;
        let mut storage = RemoteStorage::new(host.clone(), "main");

        assert_eq!(storage.publish("Nothing").await?, None);
        assert_eq!(host.commit_count("main").await, before);
        Ok(())
    }

    #[tokio::test]
    async fn test_exists_does_not_download_content() -> StorageResult<()> {
        let host = seeded_host().await;
        let storage = RemoteStorage::new(host.clone(), "main");

        assert!(storage.exists("public/images/portraits/old.webp").await?);
        assert!(!storage.exists("public/images/portraits/missing.webp").await?);
        assert!(!storage.exists("src/content/portraits").await?);
        assert_eq!(host.content_reads().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_and_lists_branch_head() -> StorageResult<()> {
        let host = seeded_host().await;
        let storage = RemoteStorage::new(host, "main");

        assert_eq!(
            storage.read("src/content/portraits/old.md").await?,
            Some(b"old".to_vec())
        );
        assert!(storage.exists("public/images/portraits/old.webp").await?);
        assert_eq!(storage.list("src/content/portraits").await?, vec!["old.md"]);
        assert!(storage.list("src/content/film").await?.is_empty());
        Ok(())
    }
}
