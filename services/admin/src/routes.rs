//! Admin service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        DeleteRequest, ItemsQuery, ItemsResponse, ReorderRequest, UpdateItemRequest,
        UpdateItemResponse, UploadBatch, UploadFile,
    },
    pipeline,
    state::AppState,
    validation::parse_flag,
};

/// Create the router for the admin service
pub fn create_router(state: AppState) -> Router {
    let gated_routes = Router::new()
        .route("/api/admin/upload", post(upload))
        .route("/api/admin/reorder", post(reorder))
        .route("/api/admin/delete", post(delete_item))
        .route("/api/admin/items", get(list_items).patch(update_item))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_session,
        ))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes::router(state.auth.clone()))
        .merge(gated_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "admin-service",
        "storage": if state.storage.is_remote() { "github" } else { "local" },
    }))
}

/// Upload a batch of photos or videos
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut batch = UploadBatch::default();
    let mut category = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                batch.files.push(UploadFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "category" => category = Some(field.text().await?),
            "featured" => batch.featured = parse_flag(&field.text().await?),
            _ => {}
        }
    }

    batch.category =
        category.ok_or_else(|| ApiError::BadRequest("Category is required".to_string()))?;

    let response = pipeline::upload::upload(&state, batch).await?;

    Ok(Json(response))
}

/// Rewrite the order of the items of a category
pub async fn reorder(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ReorderRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let rewritten = pipeline::reorder::reorder(&state, &payload).await?;

    Ok(Json(json!({"success": true, "updated": rewritten})))
}

/// Delete an item and its assets
pub async fn delete_item(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<DeleteRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    pipeline::delete::delete(&state, &payload).await?;

    Ok(Json(json!({"success": true})))
}

/// List items, optionally restricted to one category
pub async fn list_items(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ItemsQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let items = pipeline::items::list_items(&state, query.category.as_deref()).await?;

    Ok(Json(ItemsResponse { items }))
}

/// Edit the title, description or featured flag of an item
pub async fn update_item(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateItemRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let item = pipeline::items::update_item(&state, &payload).await?;

    Ok(Json(UpdateItemResponse {
        success: true,
        item,
    }))
}
