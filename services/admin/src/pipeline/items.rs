//! Listing and metadata edits

use media::{Category, ContentDocument, MediaItem};
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::UpdateItemRequest,
    pipeline::{require_document, write_document},
    state::AppState,
    validation::{parse_category, validate_id},
};

/// Order of items in a listing: by `order`, then newest first
pub fn listing_order(a: &MediaItem, b: &MediaItem) -> Ordering {
    a.record
        .order
        .cmp(&b.record.order)
        .then_with(|| b.record.date.cmp(&a.record.date))
        .then_with(|| a.id.cmp(&b.id))
}

/// List the items of one category, or of every category
pub async fn list_items(state: &AppState, category: Option<&str>) -> ApiResult<Vec<MediaItem>> {
    let categories = match category.filter(|value| !value.trim().is_empty()) {
        Some(value) => vec![parse_category(value)?],
        None => Category::ALL.to_vec(),
    };

    let storage = state.storage.open();
    let mut items = Vec::new();

    for category in categories {
        let mut listed = Vec::new();
        let names = storage.list(&state.layout.category_dir(category)).await?;

        for id in names.iter().filter_map(|name| name.strip_suffix(".md")) {
            let path = state.layout.record_path(category, id);
            let Some(bytes) = storage.read(&path).await? else {
                continue;
            };

            match ContentDocument::from_bytes(&bytes) {
                Ok(document) => listed.push(MediaItem::new(id, category, document.record)),
                Err(e) => warn!("Skipping unreadable record {}: {}", path, e),
            }
        }

        listed.sort_by(listing_order);
        items.extend(listed);
    }

    Ok(items)
}

/// Apply a metadata edit to one record and publish it
pub async fn update_item(state: &AppState, request: &UpdateItemRequest) -> ApiResult<MediaItem> {
    let category = parse_category(&request.category)?;
    validate_id(&request.id)?;

    if request.title.is_none() && request.description.is_none() && request.featured.is_none() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }

    let mut storage = state.storage.open();
    let mut document = require_document(&*storage, &state.layout, category, &request.id).await?;

    if let Some(title) = &request.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
        }
        document.record.title = title.to_string();
    }

    if let Some(description) = &request.description {
        let description = description.trim();
        document.record.description = (!description.is_empty()).then(|| description.to_string());
    }

    if let Some(featured) = request.featured {
        document.record.featured = featured;
    }

    write_document(&mut *storage, &state.layout, category, &request.id, &document).await?;

    let commit = storage
        .publish(&format!("Update {} in {}", request.id, category))
        .await?;
    state.build_hook.notify(commit.as_deref()).await;

    info!("Updated {}/{}", category, request.id);

    Ok(MediaItem::new(request.id.clone(), category, document.record))
}
