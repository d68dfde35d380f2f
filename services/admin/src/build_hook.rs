//! Rebuild notification for the hosted site

use std::time::Duration;
use tracing::{info, warn};

const HOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts to the configured build hook after a remote publish
#[derive(Clone)]
pub struct BuildHook {
    client: reqwest::Client,
    url: Option<String>,
}

impl BuildHook {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Trigger a rebuild for a published commit.
    ///
    /// Nothing happens without a commit (local mode, or nothing staged) or
    /// without a hook URL. Failures are logged and never returned.
    pub async fn notify(&self, commit: Option<&str>) {
        let (Some(url), Some(commit)) = (self.url.as_deref(), commit) else {
            return;
        };

        let result = self
            .client
            .post(url)
            .timeout(HOOK_TIMEOUT)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => info!("Triggered build hook for commit {}", commit),
            Err(e) => warn!("Build hook failed for commit {}: {}", commit, e),
        }
    }
}
