//! Error types for media processing

use thiserror::Error;

/// Failure to turn one uploaded file into its derived assets
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The upload is not a decodable image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Resizing or encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// The frame extractor could not be run or exited with an error
    #[error("Failed to extract video frame: {0}")]
    FrameExtraction(String),

    /// Temporary file handling failed
    #[error("I/O error while transcoding: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read or write a content record
#[derive(Error, Debug)]
pub enum RecordError {
    /// The document has no front-matter block
    #[error("Content record has no front matter")]
    MissingFrontMatter,

    /// The front matter is not valid YAML for a record
    #[error("Invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is not valid UTF-8
    #[error("Content record is not valid UTF-8")]
    Encoding,
}
