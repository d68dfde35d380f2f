//! Content pipelines behind the admin endpoints
//!
//! Each call opens its own storage backend, stages every change it makes
//! and publishes once at the end, so a remote call lands as one commit.

pub mod delete;
pub mod items;
pub mod reorder;
pub mod upload;

use common::StorageBackend;
use media::{AssetLayout, Category, ContentDocument};

use crate::error::{ApiError, ApiResult};

/// Read and parse the record of an item, if it exists
pub(crate) async fn read_document(
    storage: &dyn StorageBackend,
    layout: &AssetLayout,
    category: Category,
    id: &str,
) -> ApiResult<Option<ContentDocument>> {
    match storage.read(&layout.record_path(category, id)).await? {
        Some(bytes) => Ok(Some(ContentDocument::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

/// Like [`read_document`], failing with `NotFound` when the record is missing
pub(crate) async fn require_document(
    storage: &dyn StorageBackend,
    layout: &AssetLayout,
    category: Category,
    id: &str,
) -> ApiResult<ContentDocument> {
    read_document(storage, layout, category, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Item not found: {}/{}", category, id)))
}

/// Stage the rendered record of an item
pub(crate) async fn write_document(
    storage: &mut dyn StorageBackend,
    layout: &AssetLayout,
    category: Category,
    id: &str,
    document: &ContentDocument,
) -> ApiResult<String> {
    let text = document.render()?;
    storage
        .stage_or_write(&layout.record_path(category, id), text.clone().into_bytes())
        .await?;
    Ok(text)
}
