//! Request and response bodies of the admin API

use media::MediaItem;
use serde::{Deserialize, Serialize};

/// One file of an upload batch
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A parsed upload form
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    pub category: String,
    pub featured: bool,
    pub files: Vec<UploadFile>,
}

/// Outcome of one uploaded file
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub success: bool,
    /// Stored file name on success, the uploaded name on failure
    pub file: String,
    /// Rendered content record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn stored(file: String, content: String, item: MediaItem) -> Self {
        Self {
            success: true,
            file,
            content: Some(content),
            item: Some(item),
            error: None,
        }
    }

    pub fn failed(file: String, error: String) -> Self {
        Self {
            success: false,
            file,
            content: None,
            item: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub results: Vec<UploadResult>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReorderItem {
    pub id: String,
}

/// New order of the items of a category; extra item fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub category: String,
    pub items: Vec<ReorderItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub id: String,
    pub category: String,
    /// Web path of the primary asset
    pub file_path: String,
    pub thumbnail_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<MediaItem>,
}

/// Metadata edit; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    pub id: String,
    pub category: String,
    pub title: Option<String>,
    /// An empty description removes it
    pub description: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateItemResponse {
    pub success: bool,
    pub item: MediaItem,
}
