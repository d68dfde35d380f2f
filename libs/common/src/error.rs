//! Custom error types for the common library
//!
//! This module defines the error types raised by the storage backends and
//! the Git host clients they publish through.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Step of the remote publish sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    /// Reading the branch head commit
    ReadHead,
    /// Reading the head commit's tree
    ReadCommit,
    /// Uploading a staged file as a blob
    CreateBlob,
    /// Building the new tree
    CreateTree,
    /// Creating the commit object
    CreateCommit,
    /// Fast-forwarding the branch reference
    UpdateRef,
}

impl PublishStep {
    /// All steps, in execution order
    pub const ALL: [PublishStep; 6] = [
        PublishStep::ReadHead,
        PublishStep::ReadCommit,
        PublishStep::CreateBlob,
        PublishStep::CreateTree,
        PublishStep::CreateCommit,
        PublishStep::UpdateRef,
    ];
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::ReadHead => "get-ref",
            PublishStep::ReadCommit => "get-commit",
            PublishStep::CreateBlob => "create-blob",
            PublishStep::CreateTree => "create-tree",
            PublishStep::CreateCommit => "create-commit",
            PublishStep::UpdateRef => "update-ref",
        };
        f.write_str(name)
    }
}

/// Error returned by a Git host
#[derive(Error, Debug)]
pub enum GitHostError {
    /// Transport or HTTP status failure
    #[error("Git host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with a body we could not use
    #[error("Unexpected Git host response: {0}")]
    Unexpected(String),

    /// The host refused the operation
    #[error("Git host rejected the request: {0}")]
    Rejected(String),
}

/// Custom error type for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Path is absolute, empty or escapes the storage root
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    /// Local filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote read failure
    #[error("Remote storage error: {0}")]
    Remote(#[from] GitHostError),

    /// Remote publish failed; the branch was not updated
    #[error("Publish failed at {step}: {source}")]
    Publish {
        step: PublishStep,
        #[source]
        source: GitHostError,
    },

    /// Storage configuration is incomplete
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
