//! Request validation

use media::Category;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ApiError, ApiResult};

const MAX_ID_LEN: usize = 128;

pub fn parse_category(value: &str) -> ApiResult<Category> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest("Category is required".to_string()));
    }
    value
        .parse()
        .map_err(|e: media::UnknownCategory| ApiError::BadRequest(e.to_string()))
}

/// Validate an item identifier
pub fn validate_id(id: &str) -> ApiResult<()> {
    if id.is_empty() {
        return Err(ApiError::BadRequest("Item id is required".to_string()));
    }

    if id.len() > MAX_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "Item id must be at most {} characters long",
            MAX_ID_LEN
        )));
    }

    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        ID_REGEX.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("Failed to compile id regex"));

    if !regex.is_match(id) {
        return Err(ApiError::BadRequest(format!("Invalid item id: {}", id)));
    }

    Ok(())
}

/// Validate the web path of an asset sent by the client
pub fn validate_asset_path(path: &str) -> ApiResult<()> {
    let under_public = path.starts_with("/images/") || path.starts_with("/videos/");
    let suspicious = path.contains("..") || path.contains('\\') || path.contains("//");

    if !under_public || suspicious {
        return Err(ApiError::BadRequest(format!("Invalid asset path: {}", path)));
    }

    Ok(())
}

/// Interpret a multipart checkbox value
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}
