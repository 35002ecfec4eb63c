//! SVG rasterization via resvg/tiny-skia.
//!
//! The rasterizer keeps one piece of state between calls: the system font
//! database, loaded lazily on first use. It is read-only afterwards and only
//! affects which faces `<text>` can resolve, so outputs do not depend on call
//! order.

use super::calculations::{ensure_allocatable, scaled_dimensions};
use super::capabilities::{CapabilityError, VectorRasterizer};
use super::params::ScaleFactor;
use image::{DynamicImage, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Renders SVG markup with resvg. System fonts are loaded once, on the first
/// document that needs them, and shared across calls.
#[derive(Default)]
pub struct ResvgRasterizer {
    fonts: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn fonts(&self) -> Arc<usvg::fontdb::Database> {
        self.fonts
            .get_or_init(|| {
                let mut db = usvg::fontdb::Database::new();
                db.load_system_fonts();
                debug!(faces = db.len(), "Loaded system fonts for SVG text");
                Arc::new(db)
            })
            .clone()
    }
}

/// tiny-skia stores premultiplied RGBA; the rest of the pipeline expects straight alpha.
fn pixmap_to_rgba(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

impl VectorRasterizer for ResvgRasterizer {
    fn rasterize_vector(
        &self,
        markup: &[u8],
        scale: ScaleFactor,
    ) -> Result<DynamicImage, CapabilityError> {
        let options = usvg::Options {
            fontdb: self.fonts(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(markup, &options)
            .map_err(|e| CapabilityError::Failed(format!("invalid SVG: {e}")))?;

        let size = tree.size();
        let dims = scaled_dimensions(size.width(), size.height(), scale.value());
        ensure_allocatable(dims).map_err(|e| CapabilityError::Failed(e.to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(dims.width, dims.height).ok_or_else(|| {
            CapabilityError::Failed(format!(
                "cannot allocate {}x{} raster for SVG",
                dims.width, dims.height
            ))
        })?;

        let transform = tiny_skia::Transform::from_scale(
            dims.width as f32 / size.width(),
            dims.height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(DynamicImage::ImageRgba8(pixmap_to_rgba(&pixmap)))
    }
}
