//! Dual-mode content storage
//!
//! Every admin operation runs against a [`StorageBackend`] opened for that
//! operation alone. The local backend applies changes to the working tree
//! immediately; the remote backend stages them and lands them as a single
//! commit when [`StorageBackend::publish`] is called.

mod local;
mod remote;

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::git::{GitHost, GitHubClient, GitHubConfig};

pub use local::LocalStorage;
pub use remote::RemoteStorage;

/// A change waiting to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    Write(Vec<u8>),
    Delete,
}

/// A staged change and the path it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: String,
    pub change: StagedChange,
}

/// Storage contract shared by the local and remote backends
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read a file, `None` when it does not exist
    async fn read(&self, path: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Check whether a file exists
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.read(path).await?.is_some())
    }

    /// List the file names directly inside a directory
    async fn list(&self, dir: &str) -> StorageResult<Vec<String>>;

    /// Write a file now (local) or stage it for the next publish (remote)
    async fn stage_or_write(&mut self, path: &str, bytes: Vec<u8>) -> StorageResult<()>;

    /// Delete a file now (local) or stage its removal (remote)
    async fn stage_or_delete(&mut self, path: &str) -> StorageResult<()>;

    /// Wait until consumers of the storage have caught up with the last write
    async fn settle(&self);

    /// Publish every staged change as one unit.
    ///
    /// Returns the new commit SHA when something was committed.
    async fn publish(&mut self, message: &str) -> StorageResult<Option<String>>;

    /// Number of changes waiting for [`StorageBackend::publish`]
    fn pending(&self) -> usize;
}

/// Storage mode selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Local,
    Github,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_settle_delay_ms() -> u64 {
    500
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Which backend to open for each operation
    pub mode: StorageMode,
    /// Working tree root for local mode
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Time the local file watcher needs after a write
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// GitHub repository for remote mode
    #[serde(default)]
    pub github: Option<GitHubConfig>,
}

impl StorageConfig {
    /// Local storage rooted at `root` with no settle delay
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            mode: StorageMode::Local,
            root: root.into(),
            settle_delay_ms: 0,
            github: None,
        }
    }
}

/// Opens a fresh storage backend per operation
#[derive(Clone)]
pub enum StorageProvider {
    Local {
        root: PathBuf,
        settle_delay: Duration,
    },
    Remote {
        host: Arc<dyn GitHost>,
        branch: String,
    },
}

impl StorageProvider {
    /// Build the provider selected by configuration
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        match config.mode {
            StorageMode::Local => {
                info!("Using local storage rooted at {}", config.root.display());
                Ok(StorageProvider::Local {
                    root: config.root.clone(),
                    settle_delay: Duration::from_millis(config.settle_delay_ms),
                })
            }
            StorageMode::Github => {
                let github = config.github.as_ref().ok_or_else(|| {
                    StorageError::Configuration(
                        "storage.github is required in github mode".to_string(),
                    )
                })?;
                let client = GitHubClient::new(github)?;
                info!(
                    "Using GitHub storage {}/{} on branch {}",
                    github.owner, github.repo, github.branch
                );
                Ok(StorageProvider::Remote {
                    host: Arc::new(client),
                    branch: github.branch.clone(),
                })
            }
        }
    }

    /// Remote provider over an arbitrary Git host
    pub fn remote(host: Arc<dyn GitHost>, branch: impl Into<String>) -> Self {
        StorageProvider::Remote {
            host,
            branch: branch.into(),
        }
    }

    /// Open a backend owning its own staging list
    pub fn open(&self) -> Box<dyn StorageBackend> {
        match self {
            StorageProvider::Local { root, settle_delay } => {
                Box::new(LocalStorage::new(root.clone(), *settle_delay))
            }
            StorageProvider::Remote { host, branch } => {
                Box::new(RemoteStorage::new(host.clone(), branch.clone()))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StorageProvider::Remote { .. })
    }
}

/// Validate a storage path and return it in canonical `a/b/c` form.
///
/// Absolute paths, backslashes, empty segments, `.` and `..` are rejected.
pub fn normalize_path(path: &str) -> StorageResult<String> {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(segments.join("/"))
}
