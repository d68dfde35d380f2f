//! Upload orchestration: transcode, write records, publish once

use chrono::Utc;
use common::{StorageBackend, StorageError};
use media::{
    Category, ContentDocument, ContentRecord, MediaItem, MediaKind, RecordInput, Transcoded,
    models::file_extension, slugify,
};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{UploadBatch, UploadFile, UploadResponse, UploadResult},
    pipeline::write_document,
    state::AppState,
    validation::parse_category,
};

pub const VIDEO_CATEGORY_ERROR: &str = "Videos can only be uploaded to the film category";

const VIDEO_CONTAINERS: [(&str, &str); 4] = [
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
    ("video/x-m4v", "m4v"),
];

/// Why a single file was not stored
enum FileError {
    /// The file is rejected; the rest of the batch continues
    Rejected(String),
    /// Storage failed; the whole request fails
    Fatal(ApiError),
}

impl From<StorageError> for FileError {
    fn from(e: StorageError) -> Self {
        FileError::Fatal(e.into())
    }
}

impl From<ApiError> for FileError {
    fn from(e: ApiError) -> Self {
        FileError::Fatal(e)
    }
}

/// Process an upload batch and publish everything it stored in one go
pub async fn upload(state: &AppState, batch: UploadBatch) -> ApiResult<UploadResponse> {
    let category = parse_category(&batch.category)?;
    if batch.files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    let total = batch.files.len();
    info!("Uploading {} file(s) to {}", total, category);

    let mut storage = state.storage.open();
    let mut taken = existing_ids(&*storage, state, category).await?;
    let mut results = Vec::with_capacity(total);

    for (index, file) in batch.files.into_iter().enumerate() {
        if index > 0 {
            storage.settle().await;
        }

        let original = file.filename.clone();
        match store_file(state, &mut *storage, category, batch.featured, file, &mut taken).await
        {
            Ok(result) => results.push(result),
            Err(FileError::Rejected(message)) => {
                warn!("Rejected {}: {}", original, message);
                results.push(UploadResult::failed(original, message));
            }
            Err(FileError::Fatal(e)) => return Err(e),
        }
    }

    let stored = results.iter().filter(|result| result.success).count();
    let commit = storage
        .publish(&format!("Upload {} file(s) to {}", stored, category))
        .await?;
    state.build_hook.notify(commit.as_deref()).await;

    info!("Uploaded {} of {} file(s) to {}", stored, total, category);

    Ok(UploadResponse {
        success: stored > 0,
        results,
        message: format!("Uploaded {} of {} file(s)", stored, total),
    })
}

/// Ids of the records already present in a category
async fn existing_ids(
    storage: &dyn StorageBackend,
    state: &AppState,
    category: Category,
) -> ApiResult<HashSet<String>> {
    let names = storage.list(&state.layout.category_dir(category)).await?;
    Ok(names
        .iter()
        .filter_map(|name| name.strip_suffix(".md"))
        .map(str::to_string)
        .collect())
}

/// First free id derived from `base`: `base`, then `base-2`, `base-3`, ...
pub fn allocate_id(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Extension of a stored video, from its name or else its content type
fn video_extension(file: &UploadFile) -> String {
    if let Some(extension) = file_extension(&file.filename) {
        if MediaKind::detect(&file.filename, None) == Some(MediaKind::Video) {
            return extension;
        }
    }

    let content_type = file.content_type.as_deref().unwrap_or_default();
    VIDEO_CONTAINERS
        .iter()
        .find(|(mime, _)| content_type.eq_ignore_ascii_case(mime))
        .map(|(_, extension)| extension.to_string())
        .unwrap_or_else(|| "mp4".to_string())
}

async fn store_file(
    state: &AppState,
    storage: &mut dyn StorageBackend,
    category: Category,
    featured: bool,
    file: UploadFile,
    taken: &mut HashSet<String>,
) -> Result<UploadResult, FileError> {
    let kind = MediaKind::detect(&file.filename, file.content_type.as_deref())
        .ok_or_else(|| FileError::Rejected(format!("Unsupported file type: {}", file.filename)))?;

    if kind == MediaKind::Video && !category.accepts_video() {
        return Err(FileError::Rejected(VIDEO_CATEGORY_ERROR.to_string()));
    }

    if file.bytes.is_empty() {
        return Err(FileError::Rejected("File is empty".to_string()));
    }

    let id = allocate_id(&slugify(&file.filename), taken);
    let extension = match kind {
        MediaKind::Photo => "webp".to_string(),
        MediaKind::Video => video_extension(&file),
    };

    let transcoded = state
        .transcoder
        .transcode(kind, &file.filename, file.bytes)
        .await
        .map_err(|e| FileError::Rejected(e.to_string()))?;

    let input = RecordInput {
        original_filename: &file.filename,
        featured,
        created_at: Utc::now(),
    };

    let layout = &state.layout;
    let (record, assets) = match transcoded {
        Transcoded::Photo(photo) => {
            let paths = layout.photo_paths(category, &id);
            let record = ContentRecord::photo(&input, &paths, &photo);
            let mut assets = vec![
                (paths.image, photo.full.bytes),
                (paths.thumbnail, photo.thumbnail.bytes),
            ];
            if let Some(display) = photo.display {
                assets.push((paths.display, display.bytes));
            }
            (record, assets)
        }
        Transcoded::Video(video) => {
            let paths = layout.video_paths(category, &id, &extension);
            let record = ContentRecord::video(&input, &paths, &video);
            let assets = vec![
                (paths.video, video.original),
                (paths.thumbnail, video.thumbnail.bytes),
            ];
            (record, assets)
        }
    };

    for (web_path, bytes) in assets {
        storage
            .stage_or_write(&layout.repo_path(&web_path), bytes)
            .await?;
    }

    let document = ContentDocument::new(record.clone());
    let content = write_document(storage, layout, category, &id, &document).await?;

    info!("Stored {} as {}/{}", file.filename, category, id);
    taken.insert(id.clone());

    Ok(UploadResult::stored(
        format!("{}.{}", id, extension),
        content,
        MediaItem::new(id, category, record),
    ))
}
