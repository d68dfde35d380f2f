//! Where records and assets live in the site repository

use serde::Deserialize;

use crate::models::Category;

fn default_content_dir() -> String {
    "src/content".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

/// Repository layout of the static site
#[derive(Debug, Clone, Deserialize)]
pub struct AssetLayout {
    /// Directory holding one sub-directory of records per category
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    /// Directory served at the site root
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            public_dir: default_public_dir(),
        }
    }
}

/// Web paths of the assets of a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPaths {
    pub image: String,
    pub thumbnail: String,
    pub display: String,
}

/// Web paths of the assets of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPaths {
    pub video: String,
    pub thumbnail: String,
}

impl AssetLayout {
    /// Directory of the records of a category
    pub fn category_dir(&self, category: Category) -> String {
        format!("{}/{}", self.content_dir.trim_end_matches('/'), category)
    }

    /// Repository path of an item's record
    pub fn record_path(&self, category: Category, id: &str) -> String {
        format!("{}/{}.md", self.category_dir(category), id)
    }

    pub fn photo_paths(&self, category: Category, id: &str) -> PhotoPaths {
        PhotoPaths {
            image: format!("/images/{}/{}.webp", category, id),
            thumbnail: format!("/images/{}/thumbs/{}.webp", category, id),
            display: format!("/images/{}/display/{}.webp", category, id),
        }
    }

    pub fn video_paths(&self, category: Category, id: &str, extension: &str) -> VideoPaths {
        VideoPaths {
            video: format!("/videos/{}/{}.{}", category, id, extension),
            thumbnail: format!("/videos/{}/thumbs/{}.jpg", category, id),
        }
    }

    /// Repository path of an asset given its web path
    pub fn repo_path(&self, web_path: &str) -> String {
        format!(
            "{}/{}",
            self.public_dir.trim_end_matches('/'),
            web_path.trim_start_matches('/')
        )
    }
}

/// Derive an item identifier from an uploaded file name.
///
/// The extension is dropped, the stem lowercased, and every run of
/// characters outside `[a-z0-9]` becomes a single `-`.
pub fn slugify(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };

    let mut slug = String::with_capacity(stem.len());
    for c in stem.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Title shown for an upload: the original file name without its extension
pub fn title_from_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}
