//! GitHub REST client for the Git Data and contents APIs

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{
    Client, Method, RequestBuilder, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use super::{GitHost, RemoteContent, TreeChange};
use crate::error::GitHostError;

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// GitHub repository configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch the site is built from
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Token with contents write permission
    pub token: String,
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Deserialize)]
struct ObjectSha {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ObjectSha,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: ObjectSha,
}

#[derive(Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

#[derive(Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Serialize)]
struct CreateBlobRequest {
    content: String,
    encoding: &'static str,
}

#[derive(Serialize)]
struct TreeEntryRequest<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    // `null` removes the path from the base tree
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateTreeRequest<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntryRequest<'a>>,
}

#[derive(Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: [&'a str; 1],
}

#[derive(Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub implementation of [`GitHost`]
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for the configured repository
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHostError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = Client::builder()
            .user_agent(concat!("portfolio-admin/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, self.owner, self.repo, suffix
        )
    }

    fn request(&self, method: Method, suffix: &str) -> RequestBuilder {
        let url = self.repo_url(suffix);
        debug!("GitHub {} {}", method, url);
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, GitHostError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHostError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(response.json::<T>().await?)
    }

    async fn read_blob(&self, sha: &str) -> Result<Vec<u8>, GitHostError> {
        let blob: BlobResponse =
            Self::send(self.request(Method::GET, &format!("git/blobs/{}", sha))).await?;
        if blob.encoding != "base64" {
            return Err(GitHostError::Unexpected(format!(
                "blob {} has encoding {}",
                sha, blob.encoding
            )));
        }
        decode_base64(&blob.content)
    }
}

/// Decode the base64 payloads GitHub returns, which are wrapped at 60 columns
fn decode_base64(content: &str) -> Result<Vec<u8>, GitHostError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| GitHostError::Unexpected(format!("invalid base64 content: {}", e)))
}

#[async_trait]
impl GitHost for GitHubClient {
    async fn get_ref(&self, branch: &str) -> Result<String, GitHostError> {
        let reference: RefResponse =
            Self::send(self.request(Method::GET, &format!("git/ref/heads/{}", branch))).await?;
        Ok(reference.object.sha)
    }

    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String, GitHostError> {
        let commit: CommitResponse =
            Self::send(self.request(Method::GET, &format!("git/commits/{}", commit_sha))).await?;
        Ok(commit.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, GitHostError> {
        let body = CreateBlobRequest {
            content: STANDARD.encode(content),
            encoding: "base64",
        };
        let blob: ObjectSha =
            Self::send(self.request(Method::POST, "git/blobs").json(&body)).await?;
        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        changes: &[TreeChange],
    ) -> Result<String, GitHostError> {
        let body = CreateTreeRequest {
            base_tree,
            tree: changes
                .iter()
                .map(|change| TreeEntryRequest {
                    path: &change.path,
                    mode: "100644",
                    kind: "blob",
                    sha: change.blob.as_deref(),
                })
                .collect(),
        };
        let tree: ObjectSha =
            Self::send(self.request(Method::POST, "git/trees").json(&body)).await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, GitHostError> {
        let body = CreateCommitRequest {
            message,
            tree: tree_sha,
            parents: [parent_sha],
        };
        let commit: ObjectSha =
            Self::send(self.request(Method::POST, "git/commits").json(&body)).await?;
        Ok(commit.sha)
    }

    async fn update_ref(&self, branch: &str, commit_sha: &str) -> Result<(), GitHostError> {
        let body = UpdateRefRequest {
            sha: commit_sha,
            force: false,
        };
        let _: RefResponse = Self::send(
            self.request(Method::PATCH, &format!("git/refs/heads/{}", branch))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn get_content(
        &self,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteContent>, GitHostError> {
        let response = self
            .request(Method::GET, &format!("contents/{}", path))
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHostError::Rejected(format!("{}: {}", status, body)));
        }

        let value: serde_json::Value = response.json().await?;
        if value.is_array() {
            let entries: Vec<ContentEntry> = serde_json::from_value(value)
                .map_err(|e| GitHostError::Unexpected(e.to_string()))?;
            let names = entries
                .into_iter()
                .filter(|entry| entry.kind == "file")
                .map(|entry| entry.name)
                .collect();
            return Ok(Some(RemoteContent::Directory(names)));
        }

        let entry: ContentEntry =
            serde_json::from_value(value).map_err(|e| GitHostError::Unexpected(e.to_string()))?;
        if entry.kind != "file" {
            return Ok(None);
        }

        // Files over 1 MB come back without inline content
        let bytes = match (entry.encoding.as_deref(), entry.content.as_deref()) {
            (Some("base64"), Some(content)) if !content.is_empty() => decode_base64(content)?,
            _ => self.read_blob(&entry.sha).await?,
        };

        Ok(Some(RemoteContent::File(bytes)))
    }

    async fn file_exists(&self, path: &str, branch: &str) -> Result<bool, GitHostError> {
        let response = self
            .request(Method::GET, &format!("contents/{}", path))
            .query(&[("ref", branch)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHostError::Rejected(format!("{}: {}", status, body)));
        }

        let value: serde_json::Value = response.json().await?;
        Ok(is_file_entry(&value))
    }
}

/// A contents API response describing a single file; directories come back as arrays
fn is_file_entry(value: &serde_json::Value) -> bool {
    value.get("type").and_then(serde_json::Value::as_str) == Some("file")
}
