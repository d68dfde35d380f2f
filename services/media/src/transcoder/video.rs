use tokio::process::Command;
use tracing::{error, info};

use crate::error::TranscodeError;
use crate::models::{Dimensions, EncodedImage};

/// Pulls a single still frame out of a video with ffmpeg
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    ffmpeg_path: String,
    offset: String,
    size: Dimensions,
}

impl FrameExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, offset: impl Into<String>, size: Dimensions) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            offset: offset.into(),
            size,
        }
    }

    /// Extract the frame at the configured offset as a JPEG.
    ///
    /// The video is written to a private temporary directory, which is
    /// removed again whether or not ffmpeg succeeds.
    pub async fn extract_thumbnail(
        &self,
        video: &[u8],
        extension: &str,
    ) -> Result<EncodedImage, TranscodeError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join(format!("source.{}", extension));
        let output = workdir.path().join("frame.jpg");

        tokio::fs::write(&input, video).await?;

        info!(
            "Extracting frame at {} from {} byte video",
            self.offset,
            video.len()
        );

        let result = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-ss")
            .arg(&self.offset)
            .arg("-i")
            .arg(&input)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(format!("scale={}:{}", self.size.width, self.size.height))
            .arg("-f")
            .arg("image2")
            .arg(&output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                TranscodeError::FrameExtraction(format!("could not run {}: {}", self.ffmpeg_path, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let last_line = stderr.lines().last().unwrap_or_default().to_string();
            error!("FFmpeg failed with status: {:?}", result.status);
            return Err(TranscodeError::FrameExtraction(last_line));
        }

        // A clip shorter than the offset exits cleanly without writing a frame
        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                return Err(TranscodeError::FrameExtraction(format!(
                    "no frame at {}",
                    self.offset
                )));
            }
        };

        Ok(EncodedImage {
            bytes,
            dimensions: self.size,
        })
    }
}
