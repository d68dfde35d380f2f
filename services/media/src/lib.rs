//! Media processing for portfolio uploads
//!
//! Categories and file kinds, the repository layout of records and assets,
//! the content record format, and the transcoder that produces WebP images
//! and video thumbnails.

pub mod error;
pub mod layout;
pub mod models;
pub mod record;
pub mod transcoder;

pub use error::{RecordError, TranscodeError};
pub use layout::{AssetLayout, PhotoPaths, VideoPaths, slugify, title_from_filename};
pub use models::{Category, Dimensions, EncodedImage, MediaKind, Transcoded, UnknownCategory};
pub use record::{ContentDocument, ContentRecord, MediaItem, RecordInput, format_timestamp};
pub use transcoder::{MediaSettings, Transcoder};
