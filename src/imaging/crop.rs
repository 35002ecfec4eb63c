//! Non-interactive cropping for a selection made elsewhere.
//!
//! The selection rectangle is clamped to the image bounds. Elliptical
//! selections keep the ellipse inscribed in the rectangle and clear
//! everything outside it (which becomes white for JPEG output).

use super::calculations::Dimensions;
use super::capabilities::{CapabilityError, CropRegion, CropShape, CroppedImage, Cropper};
use super::encode::encode;
use super::params::Quality;
use super::surface::composite;
use crate::types::TargetFormat;
use image::{DynamicImage, RgbaImage};

#[derive(Debug, Default)]
pub struct RegionCropper;

impl RegionCropper {
    pub fn new() -> Self {
        Self
    }
}

/// Clamp `region` to an image of `bounds`. Returns `None` if nothing is left.
pub fn clamp_region(region: &CropRegion, bounds: Dimensions) -> Option<CropRegion> {
    if region.x >= bounds.width || region.y >= bounds.height {
        return None;
    }
    let width = region.width.min(bounds.width - region.x);
    let height = region.height.min(bounds.height - region.y);
    if width == 0 || height == 0 {
        return None;
    }
    Some(CropRegion {
        width,
        height,
        ..*region
    })
}

/// Zero the alpha of every pixel whose centre lies outside the inscribed ellipse.
fn mask_ellipse(img: &mut RgbaImage) {
    let rx = img.width() as f64 / 2.0;
    let ry = img.height() as f64 / 2.0;
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = (x as f64 + 0.5 - rx) / rx;
        let dy = (y as f64 + 0.5 - ry) / ry;
        if dx * dx + dy * dy > 1.0 {
            pixel[3] = 0;
        }
    }
}

impl Cropper for RegionCropper {
    fn crop(
        &self,
        bytes: &[u8],
        region: &CropRegion,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<CroppedImage, CapabilityError> {
        let img = image::load_from_memory(bytes)?;
        let bounds = Dimensions::new(img.width(), img.height());
        let region = clamp_region(region, bounds).ok_or_else(|| {
            CapabilityError::Failed(format!(
                "crop selection lies outside the {}x{} image",
                bounds.width, bounds.height
            ))
        })?;

        let mut pixels = img
            .crop_imm(region.x, region.y, region.width, region.height)
            .to_rgba8();
        if region.shape == CropShape::Ellipse {
            mask_ellipse(&mut pixels);
        }

        let dims = Dimensions::new(region.width, region.height);
        let surface = composite(&DynamicImage::ImageRgba8(pixels), dims, format)
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;
        let bytes =
            encode(&surface, format, quality).map_err(|e| CapabilityError::Failed(e.to_string()))?;

        Ok(CroppedImage {
            bytes,
            width: region.width,
            height: region.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgba, png_bytes};

    fn rect(x: u32, y: u32, width: u32, height: u32, shape: CropShape) -> CropRegion {
        CropRegion {
            x,
            y,
            width,
            height,
            shape,
        }
    }

    #[test]
    fn clamp_trims_overhang() {
        let r = clamp_region(
            &rect(80, 10, 50, 50, CropShape::Rectangle),
            Dimensions::new(100, 40),
        )
        .unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (80, 10, 20, 30));
    }

    #[test]
    fn clamp_rejects_outside_selection() {
        assert!(
            clamp_region(
                &rect(100, 0, 10, 10, CropShape::Rectangle),
                Dimensions::new(100, 40)
            )
            .is_none()
        );
        assert!(
            clamp_region(
                &rect(0, 0, 0, 10, CropShape::Rectangle),
                Dimensions::new(100, 40)
            )
            .is_none()
        );
    }

    #[test]
    fn rectangle_crop_reports_dimensions() {
        let src = png_bytes(&gradient_rgba(100, 80));
        let out = RegionCropper::new()
            .crop(
                &src,
                &rect(10, 20, 30, 40, CropShape::Rectangle),
                TargetFormat::Png,
                Quality::default(),
            )
            .unwrap();
        assert_eq!((out.width, out.height), (30, 40));
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 40));
    }

    #[test]
    fn rectangle_crop_copies_source_pixels() {
        let source = gradient_rgba(100, 80);
        let out = RegionCropper::new()
            .crop(
                &png_bytes(&source),
                &rect(10, 20, 30, 40, CropShape::Rectangle),
                TargetFormat::Png,
                Quality::default(),
            )
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), source.get_pixel(10, 20));
    }

    #[test]
    fn ellipse_clears_corners_keeps_centre() {
        let src = png_bytes(&gradient_rgba(60, 60));
        let out = RegionCropper::new()
            .crop(
                &src,
                &rect(0, 0, 60, 40, CropShape::Ellipse),
                TargetFormat::Png,
                Quality::default(),
            )
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(decoded.get_pixel(59, 39)[3], 0);
        assert_eq!(decoded.get_pixel(30, 20)[3], 255);
    }

    #[test]
    fn ellipse_to_jpeg_has_white_corners() {
        let src = png_bytes(&gradient_rgba(40, 40));
        let out = RegionCropper::new()
            .crop(
                &src,
                &rect(0, 0, 40, 40, CropShape::Ellipse),
                TargetFormat::Jpeg,
                Quality::new(1.0),
            )
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
        let corner = decoded.get_pixel(0, 0);
        assert!(corner.0.iter().all(|&c| c > 240), "{corner:?}");
    }
}
