//! Git hosting API used by the remote storage backend
//!
//! The remote backend only needs the low-level Git Data operations: reading
//! the branch head, creating blobs, trees and commits, and moving the branch
//! reference. Reads of individual files go through the contents API.

mod github;
#[cfg(any(test, feature = "test-util"))]
mod memory;

use async_trait::async_trait;

use crate::error::GitHostError;

pub use github::{GitHubClient, GitHubConfig};
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryGitHost;

/// One entry of a tree built on top of a base tree.
///
/// `blob: None` removes the path from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    pub path: String,
    pub blob: Option<String>,
}

/// Content stored at a path on a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    File(Vec<u8>),
    /// Names of the files directly inside the directory
    Directory(Vec<String>),
}

/// Git hosting provider operations
#[async_trait]
pub trait GitHost: Send + Sync {
    /// SHA of the commit the branch points to
    async fn get_ref(&self, branch: &str) -> Result<String, GitHostError>;

    /// SHA of the tree of a commit
    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String, GitHostError>;

    /// Store content as a blob and return its SHA
    async fn create_blob(&self, content: &[u8]) -> Result<String, GitHostError>;

    /// Create a tree from `base_tree` plus `changes` and return its SHA
    async fn create_tree(
        &self,
        base_tree: &str,
        changes: &[TreeChange],
    ) -> Result<String, GitHostError>;

    /// Create a commit object and return its SHA
    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, GitHostError>;

    /// Fast-forward the branch to `commit_sha`
    async fn update_ref(&self, branch: &str, commit_sha: &str) -> Result<(), GitHostError>;

    /// Read a file or directory on a branch, `None` when it does not exist
    async fn get_content(
        &self,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteContent>, GitHostError>;

    /// Whether a file exists on a branch, without fetching its content
    async fn file_exists(&self, path: &str, branch: &str) -> Result<bool, GitHostError>;
}
