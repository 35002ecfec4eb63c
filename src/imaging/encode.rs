//! Surface → encoded bytes.
//!
//! | Format | Encoder | Quality |
//! |---|---|---|
//! | PNG | `image::codecs::png::PngEncoder` (RGBA8) | ignored (lossless) |
//! | JPEG | `image::codecs::jpeg::JpegEncoder` (RGB8) | `Quality::percent` |
//! | WebP | `webp::Encoder` (libwebp, RGBA) | `quality * 100` |
//!
//! The `image` crate only writes lossless WebP, so lossy WebP goes through
//! the `webp` crate.

use super::params::Quality;
use super::surface::Surface;
use crate::types::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// libwebp refuses anything larger on either edge.
const WEBP_MAX_DIMENSION: u32 = 16383;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{format} encoder failed: {source}")]
    Codec {
        format: TargetFormat,
        #[source]
        source: image::ImageError,
    },
    #[error("WebP encoder failed: {0}")]
    WebP(String),
    #[error("{format} encoder produced no output")]
    Empty { format: TargetFormat },
}

/// Encode a surface. Fails with [`EncodeError::Empty`] rather than returning
/// a zero-byte payload.
pub fn encode(
    surface: &Surface,
    format: TargetFormat,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    let pixels = surface.pixels();
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::Empty { format });
    }

    let mut buffer = Vec::new();
    match format {
        TargetFormat::Png => {
            PngEncoder::new(&mut buffer)
                .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|source| EncodeError::Codec { format, source })?;
        }
        TargetFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality.percent())
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|source| EncodeError::Codec { format, source })?;
        }
        TargetFormat::Webp => {
            if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
                return Err(EncodeError::WebP(format!(
                    "{width}x{height} exceeds the {WEBP_MAX_DIMENSION}px WebP limit"
                )));
            }
            let memory = webp::Encoder::from_rgba(pixels.as_raw(), width, height)
                .encode_simple(false, quality.value() * 100.0)
                .map_err(|e| EncodeError::WebP(format!("{e:?}")))?;
            buffer.extend_from_slice(&memory);
        }
    }

    if buffer.is_empty() {
        return Err(EncodeError::Empty { format });
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::Dimensions;
    use crate::imaging::surface::composite;
    use crate::test_helpers::gradient_rgba;

    fn surface_for(format: TargetFormat) -> Surface {
        let src = DynamicImage::ImageRgba8(gradient_rgba(64, 48));
        composite(&src, Dimensions::new(64, 48), format).unwrap()
    }

    #[test]
    fn png_output_has_signature_and_dimensions() {
        let bytes = encode(&surface_for(TargetFormat::Png), TargetFormat::Png, Quality::default())
            .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn jpeg_output_has_soi_marker() {
        let bytes = encode(&surface_for(TargetFormat::Jpeg), TargetFormat::Jpeg, Quality::new(0.8))
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn webp_output_is_riff_webp() {
        let bytes = encode(&surface_for(TargetFormat::Webp), TargetFormat::Webp, Quality::new(0.8))
            .unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn png_ignores_quality() {
        let surface = surface_for(TargetFormat::Png);
        let low = encode(&surface, TargetFormat::Png, Quality::new(0.1)).unwrap();
        let high = encode(&surface, TargetFormat::Png, Quality::new(1.0)).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn jpeg_quality_changes_size() {
        let surface = surface_for(TargetFormat::Jpeg);
        let low = encode(&surface, TargetFormat::Jpeg, Quality::new(0.1)).unwrap();
        let high = encode(&surface, TargetFormat::Jpeg, Quality::new(1.0)).unwrap();
        assert!(low.len() < high.len());
    }
}
