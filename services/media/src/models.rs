use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portfolio category an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Portraits,
    Landscapes,
    Street,
    Film,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Portraits,
        Category::Landscapes,
        Category::Street,
        Category::Film,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Portraits => "portraits",
            Category::Landscapes => "landscapes",
            Category::Street => "street",
            Category::Film => "film",
        }
    }

    /// Only the film category accepts video uploads
    pub fn accepts_video(&self) -> bool {
        matches!(self, Category::Film)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "webm", "m4v"];

impl MediaKind {
    /// Determine the kind from the declared content type, falling back on
    /// the file extension when the content type is missing or generic
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<MediaKind> {
        match content_type.map(|ct| ct.to_ascii_lowercase()) {
            Some(ct) if ct.starts_with("image/") => return Some(MediaKind::Photo),
            Some(ct) if ct.starts_with("video/") => return Some(MediaKind::Video),
            _ => {}
        }

        let extension = file_extension(filename)?;
        if PHOTO_EXTENSIONS.contains(&extension.as_str()) {
            Some(MediaKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Lowercased extension of a file name, without the dot
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded image and its dimensions
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Derived assets of an uploaded photo
#[derive(Debug, Clone)]
pub struct TranscodedPhoto {
    /// Natural size of the uploaded image
    pub source: Dimensions,
    pub full: EncodedImage,
    pub thumbnail: EncodedImage,
    /// Higher-resolution variant, only produced for large sources
    pub display: Option<EncodedImage>,
}

/// Derived assets of an uploaded video
#[derive(Debug, Clone)]
pub struct TranscodedVideo {
    /// The uploaded file, unmodified
    pub original: Vec<u8>,
    /// Still frame in JPEG
    pub thumbnail: EncodedImage,
}

/// Output of the transcoder for one file
#[derive(Debug, Clone)]
pub enum Transcoded {
    Photo(TranscodedPhoto),
    Video(TranscodedVideo),
}
