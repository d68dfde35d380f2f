//! Deletion of an item: its record, its asset and its derived images

use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::DeleteRequest,
    pipeline::require_document,
    state::AppState,
    validation::{parse_category, validate_asset_path, validate_id},
};

/// Delete an item and publish the removal as one change.
///
/// The record and its primary asset must exist, and the paths in the request
/// must be the ones the record references. The record's thumbnail and
/// display variant are removed when present; a missing one is only logged.
pub async fn delete(state: &AppState, request: &DeleteRequest) -> ApiResult<()> {
    let category = parse_category(&request.category)?;
    validate_id(&request.id)?;
    validate_asset_path(&request.file_path)?;
    if let Some(thumbnail) = &request.thumbnail_path {
        validate_asset_path(thumbnail)?;
    }

    let layout = &state.layout;
    let mut storage = state.storage.open();

    let document = require_document(&*storage, layout, category, &request.id).await?;
    let record = &document.record;

    if record.asset() != Some(request.file_path.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "{} is not the asset of {}",
            request.file_path, request.id
        )));
    }
    if let Some(thumbnail) = &request.thumbnail_path {
        if thumbnail != &record.thumbnail {
            return Err(ApiError::BadRequest(format!(
                "{} is not the thumbnail of {}",
                thumbnail, request.id
            )));
        }
    }

    let asset_path = layout.repo_path(&request.file_path);
    if !storage.exists(&asset_path).await? {
        return Err(ApiError::NotFound(format!(
            "Asset not found: {}",
            request.file_path
        )));
    }

    storage
        .stage_or_delete(&layout.record_path(category, &request.id))
        .await?;
    storage.stage_or_delete(&asset_path).await?;

    let mut derived = vec![record.thumbnail.clone()];
    derived.extend(record.display.clone());
    derived.retain(|path| path != &request.file_path);
    derived.dedup();

    for web_path in derived {
        if validate_asset_path(&web_path).is_err() {
            warn!("Skipping unexpected asset path {} of {}", web_path, request.id);
            continue;
        }

        let repo_path = layout.repo_path(&web_path);
        if storage.exists(&repo_path).await? {
            storage.stage_or_delete(&repo_path).await?;
        } else {
            warn!("{} of {} is already gone", web_path, request.id);
        }
    }

    let commit = storage
        .publish(&format!("Delete {} from {}", request.id, category))
        .await?;
    state.build_hook.notify(commit.as_deref()).await;

    info!("Deleted {}/{}", category, request.id);

    Ok(())
}
