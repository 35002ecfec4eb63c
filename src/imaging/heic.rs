//! HEIC/HEIF decoding via the system libheif (feature `heic`).
//!
//! libheif only decodes; the decoded primary image is composited and encoded
//! with the crate's own surface/encoder so HEIC output follows the same
//! alpha and quality rules as every other path.

use super::capabilities::{CapabilityError, HeicDecoder};
use super::params::Quality;
use crate::types::TargetFormat;

#[derive(Debug, Default)]
pub struct LibHeifDecoder;

impl LibHeifDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "heic")]
fn decode_primary(bytes: &[u8]) -> Result<image::RgbaImage, CapabilityError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let failed = |e: libheif_rs::HeifError| CapabilityError::Failed(format!("libheif: {e}"));

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(failed)?;
    let handle = ctx.primary_image_handle().map_err(failed)?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(failed)?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| CapabilityError::Failed("libheif returned no interleaved plane".into()))?;

    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 4;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| CapabilityError::Failed("decoded HEIC buffer has the wrong size".into()))
}

impl HeicDecoder for LibHeifDecoder {
    #[cfg(feature = "heic")]
    fn decode_heic(
        &self,
        bytes: &[u8],
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CapabilityError> {
        use super::calculations::Dimensions;
        use super::encode::encode;
        use super::surface::composite;

        let rgba = decode_primary(bytes)?;
        let natural = Dimensions::new(rgba.width(), rgba.height());
        let surface = composite(&image::DynamicImage::ImageRgba8(rgba), natural, format)
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;
        encode(&surface, format, quality).map_err(|e| CapabilityError::Failed(e.to_string()))
    }

    #[cfg(not(feature = "heic"))]
    fn decode_heic(
        &self,
        _bytes: &[u8],
        _format: TargetFormat,
        _quality: Quality,
    ) -> Result<Vec<u8>, CapabilityError> {
        Err(CapabilityError::Unavailable(
            "HEIC decoding requires the `heic` feature",
        ))
    }
}

#[cfg(all(test, not(feature = "heic")))]
mod tests {
    use super::*;

    #[test]
    fn reports_unavailable_without_feature() {
        let err = LibHeifDecoder::new()
            .decode_heic(b"", TargetFormat::Jpeg, Quality::default())
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Unavailable(_)));
    }
}
