//! Content records: one Markdown document with YAML front matter per item
//!
//! The static site reads these documents through its content collections,
//! so the field names follow the site's schema (`thumbnailWidth`, ...).
//! Building a record is pure formatting; reading and writing it is left to
//! the storage layer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RecordError;
use crate::layout::{PhotoPaths, VideoPaths, title_from_filename};
use crate::models::{Category, MediaKind, TranscodedPhoto, TranscodedVideo};

const DELIMITER: &str = "---";

/// Front matter of a content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_height: Option<u32>,
    #[serde(default)]
    pub featured: bool,
    pub date: String,
    #[serde(default)]
    pub order: i64,
    /// Keys this service does not manage, kept as they are
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Upload parameters shared by photo and video records
#[derive(Debug, Clone)]
pub struct RecordInput<'a> {
    pub original_filename: &'a str,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// ISO-8601 UTC timestamp with millisecond precision
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ContentRecord {
    fn base(input: &RecordInput<'_>, thumbnail: String) -> Self {
        Self {
            title: title_from_filename(input.original_filename),
            description: None,
            image: None,
            video: None,
            thumbnail,
            display: None,
            width: None,
            height: None,
            thumbnail_width: None,
            thumbnail_height: None,
            featured: input.featured,
            date: format_timestamp(input.created_at),
            order: 0,
            extra: BTreeMap::new(),
        }
    }

    /// Record of a newly uploaded photo
    pub fn photo(input: &RecordInput<'_>, paths: &PhotoPaths, photo: &TranscodedPhoto) -> Self {
        let mut record = Self::base(input, paths.thumbnail.clone());
        record.image = Some(paths.image.clone());
        record.width = Some(photo.source.width);
        record.height = Some(photo.source.height);
        if photo.display.is_some() {
            record.display = Some(paths.display.clone());
        }
        record
    }

    /// Record of a newly uploaded video
    pub fn video(input: &RecordInput<'_>, paths: &VideoPaths, video: &TranscodedVideo) -> Self {
        let mut record = Self::base(input, paths.thumbnail.clone());
        record.video = Some(paths.video.clone());
        record.thumbnail_width = Some(video.thumbnail.dimensions.width);
        record.thumbnail_height = Some(video.thumbnail.dimensions.height);
        record
    }

    pub fn kind(&self) -> MediaKind {
        if self.video.is_some() {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }

    /// Web path of the full-size asset
    pub fn asset(&self) -> Option<&str> {
        self.image.as_deref().or(self.video.as_deref())
    }
}

/// A content record together with the Markdown body that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDocument {
    pub record: ContentRecord,
    pub body: String,
}

impl ContentDocument {
    pub fn new(record: ContentRecord) -> Self {
        Self {
            record,
            body: String::new(),
        }
    }

    /// Parse a document made of a `---` delimited YAML block and a body
    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let rest = text
            .strip_prefix(DELIMITER)
            .ok_or(RecordError::MissingFrontMatter)?;
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .ok_or(RecordError::MissingFrontMatter)?;

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == DELIMITER {
                let record = serde_yaml::from_str(&rest[..offset])?;
                let body = rest[offset + line.len()..].to_string();
                return Ok(Self { record, body });
            }
            offset += line.len();
        }

        Err(RecordError::MissingFrontMatter)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let text = std::str::from_utf8(bytes).map_err(|_| RecordError::Encoding)?;
        Self::parse(text)
    }

    pub fn render(&self) -> Result<String, RecordError> {
        let yaml = serde_yaml::to_string(&self.record)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{}", self.body))
    }
}

/// An item as listed by the admin API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub category: Category,
    pub kind: MediaKind,
    #[serde(flatten)]
    pub record: ContentRecord,
}

impl MediaItem {
    pub fn new(id: impl Into<String>, category: Category, record: ContentRecord) -> Self {
        Self {
            id: id.into(),
            category,
            kind: record.kind(),
            record,
        }
    }
}
