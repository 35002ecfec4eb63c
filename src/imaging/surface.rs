//! Off-screen compositing surface shared by every transform.
//!
//! [`composite`] does not know where its drawable came from: a direct raster
//! decode, a rasterized SVG, a rendered PDF page and a segmented foreground
//! all go through the same call.
//!
//! Scaling is always Lanczos3. Transforms are one-shot and user-initiated, so
//! there is no fast path trading quality for speed.

use super::calculations::{Dimensions, GeometryError, ensure_allocatable};
use crate::types::TargetFormat;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::debug;

/// A target-sized RGBA pixel buffer ready for encoding.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    opaque: bool,
}

impl Surface {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    /// True when every pixel has been flattened onto an opaque background.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

}

/// Straight-alpha "over" onto opaque white, rounded per channel.
fn over_white(px: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    let a = a as u32;
    let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
    Rgba([blend(r), blend(g), blend(b), 255])
}

/// Draw `source` scaled to exactly `target`.
///
/// When `format` has no alpha channel the surface is first filled with opaque
/// white so transparent regions do not come out black; otherwise the
/// source's transparency is kept as-is.
pub fn composite(
    source: &DynamicImage,
    target: Dimensions,
    format: TargetFormat,
) -> Result<Surface, GeometryError> {
    if source.width() == 0 || source.height() == 0 {
        return Err(GeometryError::EmptySource {
            width: source.width(),
            height: source.height(),
        });
    }
    if target.width == 0 {
        return Err(GeometryError::ZeroRequest { axis: "width" });
    }
    if target.height == 0 {
        return Err(GeometryError::ZeroRequest { axis: "height" });
    }
    ensure_allocatable(target)?;

    let rgba = source.to_rgba8();
    let scaled = if rgba.dimensions() == (target.width, target.height) {
        rgba
    } else {
        debug!(
            from_w = rgba.width(),
            from_h = rgba.height(),
            to_w = target.width,
            to_h = target.height,
            "Scaling onto surface"
        );
        imageops::resize(&rgba, target.width, target.height, FilterType::Lanczos3)
    };

    if format.supports_alpha() {
        return Ok(Surface {
            pixels: scaled,
            opaque: false,
        });
    }

    let mut canvas = scaled;
    for p in canvas.pixels_mut() {
        *p = over_white(*p);
    }
    Ok(Surface {
        pixels: canvas,
        opaque: true,
    })
}
