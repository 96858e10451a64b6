//! Placeholder image synthesis and best-effort dimension probing
//!
//! Both directions use the `image` crate, so anything [`dummy_image`]
//! produces is decodable by [`read_dimensions`].

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, ImageError, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

/// JPEG quality for synthesized payloads
const JPEG_QUALITY: u8 = 100;

/// NeuQuant sampling speed for GIF; the encoder only accepts 1..=30
const GIF_SPEED: i32 = 10;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Errors while synthesizing a placeholder image
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// MIME type does not name an image format
    #[error("unsupported image mime type: {0}")]
    UnsupportedMimeType(String),

    /// Zero width or height
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Encoder failure
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Read the dimensions of `data` from its image header
///
/// Pixels are never decoded, so size limits on full decodes do not apply.
/// Returns `None` on any failure, including a panicking decoder. Absence of
/// dimensions says nothing about whether the payload is valid.
#[must_use]
pub fn read_dimensions(data: &[u8]) -> Option<Dimensions> {
    match panic::catch_unwind(AssertUnwindSafe(|| header_dimensions(data))) {
        Ok(Ok((width, height))) => Some(Dimensions { width, height }),
        Ok(Err(err)) => {
            tracing::debug!(len = data.len(), error = %err, "payload is not a decodable image");
            None
        }
        Err(_) => {
            tracing::debug!(len = data.len(), "image decoder panicked");
            None
        }
    }
}

fn header_dimensions(data: &[u8]) -> Result<(u32, u32), ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
}

/// Encode an empty image of the given size in the format named by `mime_type`
///
/// # Errors
/// Returns error for non-image MIME types, zero dimensions or encoder failures
pub fn dummy_image(width: u32, height: u32, mime_type: &str) -> Result<Vec<u8>, SynthesisError> {
    if width == 0 || height == 0 {
        return Err(SynthesisError::InvalidDimensions { width, height });
    }
    let format = ImageFormat::from_mime_type(mime_type)
        .ok_or_else(|| SynthesisError::UnsupportedMimeType(mime_type.to_string()))?;

    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new_with_speed(&mut out, GIF_SPEED);
            encoder.encode_frame(Frame::new(RgbaImage::new(width, height)))?;
        }
        ImageFormat::Jpeg => {
            // no alpha channel in JPEG
            let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
            encoder.encode_image(&RgbImage::new(width, height))?;
        }
        other => DynamicImage::new_rgba8(width, height).write_to(&mut out, other)?,
    }
    Ok(out.into_inner())
}
