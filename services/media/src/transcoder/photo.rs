use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::GenericImageView;
use webp::Encoder;

use super::MediaSettings;
use crate::error::TranscodeError;
use crate::models::{Dimensions, EncodedImage, TranscodedPhoto};

/// Largest width or height a WebP image can have
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Size of an image scaled down to `max_width`; never scales up
pub fn capped_dimensions(source: Dimensions, max_width: u32) -> Dimensions {
    if source.width <= max_width || source.width == 0 {
        return source;
    }

    let ratio = max_width as f64 / source.width as f64;
    let height = ((source.height as f64) * ratio).round().max(1.0) as u32;
    Dimensions {
        width: max_width,
        height,
    }
}

/// Decode an uploaded image and encode its WebP variants
pub fn transcode_photo(
    bytes: &[u8],
    settings: &MediaSettings,
) -> Result<TranscodedPhoto, TranscodeError> {
    let img = image::load_from_memory(bytes).map_err(|e| TranscodeError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();
    let source = Dimensions { width, height };

    // Re-encoding from raw pixels drops EXIF and other metadata
    let src = if img.color().has_alpha() {
        Image::from_vec_u8(width, height, img.into_rgba8().into_raw(), PixelType::U8x4)
    } else {
        Image::from_vec_u8(width, height, img.into_rgb8().into_raw(), PixelType::U8x3)
    }
    .map_err(|e| TranscodeError::Decode(format!("Failed to create image buffer: {}", e)))?;

    let mut resizer = Resizer::new();
    let full = encode_capped(
        &src,
        source,
        settings.full_max_width,
        settings.full_quality,
        &mut resizer,
    )?;
    let thumbnail = encode_capped(
        &src,
        source,
        settings.thumb_max_width,
        settings.thumb_quality,
        &mut resizer,
    )?;

    let display = match settings.display_max_width {
        Some(max_width) if width > settings.full_max_width => Some(encode_capped(
            &src,
            source,
            max_width,
            settings.display_quality,
            &mut resizer,
        )?),
        _ => None,
    };

    Ok(TranscodedPhoto {
        source,
        full,
        thumbnail,
        display,
    })
}

fn encode_capped(
    src: &Image<'_>,
    source: Dimensions,
    max_width: u32,
    quality: f32,
    resizer: &mut Resizer,
) -> Result<EncodedImage, TranscodeError> {
    let target = capped_dimensions(source, max_width);
    if target.width > WEBP_MAX_DIMENSION || target.height > WEBP_MAX_DIMENSION {
        return Err(TranscodeError::Encode(format!(
            "{}x{} exceeds the WebP limit of {} px per side",
            target.width, target.height, WEBP_MAX_DIMENSION
        )));
    }

    let resized;
    let pixels = if target == source {
        src.buffer()
    } else {
        let mut dst = Image::new(target.width, target.height, src.pixel_type());
        resizer
            .resize(
                src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
            )
            .map_err(|e| TranscodeError::Encode(format!("Resize failed: {}", e)))?;
        resized = dst;
        resized.buffer()
    };

    let encoder = match src.pixel_type() {
        PixelType::U8x4 => Encoder::from_rgba(pixels, target.width, target.height),
        _ => Encoder::from_rgb(pixels, target.width, target.height),
    };
    let webp = encoder
        .encode_simple(false, quality)
        .map_err(|e| TranscodeError::Encode(format!("WebP encoding failed: {:?}", e)))?;

    Ok(EncodedImage {
        bytes: webp.to_vec(),
        dimensions: target,
    })
}
