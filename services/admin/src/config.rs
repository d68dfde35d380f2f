//! Service configuration
//!
//! Settings come from an optional TOML file (`admin.toml`, or the path in
//! `ADMIN_CONFIG`) overlaid with `ADMIN__`-prefixed environment variables,
//! where `__` separates nested keys: `ADMIN__STORAGE__MODE=github`,
//! `ADMIN__AUTH__ALLOWED_USERS=alice,bob`.

use anyhow::{Context, Result};
use auth::AuthConfig;
use common::StorageConfig;
use config::{Config, Environment, File};
use media::{AssetLayout, MediaSettings};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "admin.toml";

fn default_bind() -> String {
    "0.0.0.0:3002".to_string()
}

fn default_max_upload_bytes() -> usize {
    200 * 1024 * 1024
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Request body limit for uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub layout: AssetLayout,
    #[serde(default)]
    pub media: MediaSettings,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub build_hook_url: Option<String>,
}

impl AdminConfig {
    /// Load the configuration from the config file and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("ADMIN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let settings = Config::builder()
            .set_default("storage.mode", "local")?
            .add_source(File::from(path.clone()).required(false))
            .add_source(
                Environment::with_prefix("ADMIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.allowed_users"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: AdminConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(config)
    }
}
