//! Turns uploaded files into the assets the site serves
//!
//! Photos are decoded and re-encoded as WebP at capped widths on the
//! blocking pool. Videos are kept as uploaded and get a JPEG thumbnail
//! taken from a single frame.

mod photo;
mod video;

pub use photo::{capped_dimensions, transcode_photo};
pub use video::FrameExtractor;

use serde::Deserialize;
use tracing::info;

use crate::error::TranscodeError;
use crate::models::{Dimensions, MediaKind, Transcoded, TranscodedVideo, file_extension};

/// Encoding settings for uploads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub full_max_width: u32,
    pub full_quality: f32,
    pub thumb_max_width: u32,
    pub thumb_quality: f32,
    /// Width of the optional high-resolution variant
    pub display_max_width: Option<u32>,
    pub display_quality: f32,
    pub ffmpeg_path: String,
    /// Position of the video frame used as thumbnail, as `HH:MM:SS`
    pub frame_offset: String,
    pub video_thumb_width: u32,
    pub video_thumb_height: u32,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            full_max_width: 2000,
            full_quality: 85.0,
            thumb_max_width: 600,
            thumb_quality: 70.0,
            display_max_width: None,
            display_quality: 90.0,
            ffmpeg_path: "ffmpeg".to_string(),
            frame_offset: "00:00:01".to_string(),
            video_thumb_width: 1280,
            video_thumb_height: 720,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcoder {
    settings: MediaSettings,
    frames: FrameExtractor,
}

impl Transcoder {
    pub fn new(settings: MediaSettings) -> Self {
        let frames = FrameExtractor::new(
            settings.ffmpeg_path.clone(),
            settings.frame_offset.clone(),
            Dimensions {
                width: settings.video_thumb_width,
                height: settings.video_thumb_height,
            },
        );
        Self { settings, frames }
    }

    /// Produce the derived assets of one uploaded file
    pub async fn transcode(
        &self,
        kind: MediaKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Transcoded, TranscodeError> {
        match kind {
            MediaKind::Photo => {
                let settings = self.settings.clone();
                let photo = tokio::task::spawn_blocking(move || transcode_photo(&bytes, &settings))
                    .await
                    .map_err(|e| TranscodeError::Encode(format!("Transcoding task failed: {}", e)))??;

                info!(
                    "Transcoded {} ({}x{}) to {}x{}",
                    filename,
                    photo.source.width,
                    photo.source.height,
                    photo.full.dimensions.width,
                    photo.full.dimensions.height
                );
                Ok(Transcoded::Photo(photo))
            }
            MediaKind::Video => {
                let extension = file_extension(filename).unwrap_or_else(|| "mp4".to_string());
                let thumbnail = self.frames.extract_thumbnail(&bytes, &extension).await?;

                info!("Extracted thumbnail for {}", filename);
                Ok(Transcoded::Video(TranscodedVideo {
                    original: bytes,
                    thumbnail,
                }))
            }
        }
    }
}
