//! Application state shared across handlers

use anyhow::{Context, Result};
use auth::AuthState;
use common::StorageProvider;
use media::{AssetLayout, Transcoder};
use std::sync::Arc;

use crate::{build_hook::BuildHook, config::AdminConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Opens one storage backend per request
    pub storage: StorageProvider,
    pub layout: Arc<AssetLayout>,
    pub transcoder: Arc<Transcoder>,
    pub auth: AuthState,
    pub build_hook: BuildHook,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the state from the configuration, opening the configured storage
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        let storage =
            StorageProvider::from_config(&config.storage).context("Failed to set up storage")?;
        Self::with_storage(config, storage)
    }

    /// Build the state around an already constructed storage provider
    pub fn with_storage(config: &AdminConfig, storage: StorageProvider) -> Result<Self> {
        let auth = AuthState::new(config.auth.clone()).context("Failed to set up authentication")?;

        Ok(Self {
            storage,
            layout: Arc::new(config.layout.clone()),
            transcoder: Arc::new(Transcoder::new(config.media.clone())),
            auth,
            build_hook: BuildHook::new(config.build_hook_url.clone()),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}
