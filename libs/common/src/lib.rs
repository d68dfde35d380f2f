//! Common library for the portfolio admin service
//!
//! This crate provides the storage layer shared by the admin pipelines: the
//! dual-mode storage backend (working tree or single-commit publishing to a
//! Git host), the GitHub client it publishes through, and their error types.

pub mod error;
pub mod git;
pub mod storage;

pub use error::{GitHostError, PublishStep, StorageError, StorageResult};
pub use storage::{StorageBackend, StorageConfig, StorageMode, StorageProvider};
