//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Rounding is `f64::round` (half away from zero) throughout, and every
//! computed edge is at least one pixel.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("source has zero-sized dimensions {width}x{height}")]
    EmptySource { width: u32, height: u32 },
    #[error("requested {axis} must be positive")]
    ZeroRequest { axis: &'static str },
    #[error("{width}x{height} exceeds the 16384x16384 pixel limit")]
    TooLarge { width: u32, height: u32 },
}

/// Largest surface any transform will allocate (16384 x 16384, 1 GiB of RGBA).
pub const MAX_PIXELS: u64 = 16_384 * 16_384;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn longer_edge(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Reject sizes whose RGBA buffer would exceed [`MAX_PIXELS`].
pub fn ensure_allocatable(dims: Dimensions) -> Result<Dimensions, GeometryError> {
    if dims.pixel_count() > MAX_PIXELS {
        return Err(GeometryError::TooLarge {
            width: dims.width,
            height: dims.height,
        });
    }
    Ok(dims)
}

/// Which target dimensions a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
}

fn round_px(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Resolve the output size for a resize.
///
/// With the aspect ratio locked:
/// - neither dimension → natural size
/// - width only → `height = round(width / aspect)`
/// - height only → `width = round(height * aspect)`
/// - both → fit within the box (see [`fit_within`]), never exceeding either bound
///
/// Unlocked, requested values are used verbatim and a missing one keeps its
/// natural value.
///
/// # Examples
/// ```
/// # use pixelsmith::imaging::{Dimensions, SizeRequest, resolve_dimensions};
/// let natural = Dimensions::new(1000, 500);
/// let req = SizeRequest { width: Some(400), height: None, maintain_aspect_ratio: true };
/// assert_eq!(resolve_dimensions(natural, &req).unwrap(), Dimensions::new(400, 200));
/// ```
pub fn resolve_dimensions(
    natural: Dimensions,
    request: &SizeRequest,
) -> Result<Dimensions, GeometryError> {
    if natural.width == 0 || natural.height == 0 {
        return Err(GeometryError::EmptySource {
            width: natural.width,
            height: natural.height,
        });
    }
    if request.width == Some(0) {
        return Err(GeometryError::ZeroRequest { axis: "width" });
    }
    if request.height == Some(0) {
        return Err(GeometryError::ZeroRequest { axis: "height" });
    }

    if !request.maintain_aspect_ratio {
        return ensure_allocatable(Dimensions {
            width: request.width.unwrap_or(natural.width),
            height: request.height.unwrap_or(natural.height),
        });
    }

    let aspect = natural.aspect_ratio();
    let resolved = match (request.width, request.height) {
        (None, None) => natural,
        (Some(w), None) => Dimensions::new(w, round_px(w as f64 / aspect)),
        (None, Some(h)) => Dimensions::new(round_px(h as f64 * aspect), h),
        (Some(w), Some(h)) => fit_within(natural, Dimensions::new(w, h)),
    };
    ensure_allocatable(resolved)
}

/// Scale `source` uniformly so both edges fit inside `bounds`.
///
/// Upscales when the source is smaller than the box. The result never
/// exceeds either bound.
pub fn fit_within(source: Dimensions, bounds: Dimensions) -> Dimensions {
    let scale_w = bounds.width as f64 / source.width as f64;
    let scale_h = bounds.height as f64 / source.height as f64;
    let scale = scale_w.min(scale_h);
    Dimensions {
        width: round_px(source.width as f64 * scale).min(bounds.width.max(1)),
        height: round_px(source.height as f64 * scale).min(bounds.height.max(1)),
    }
}

/// Like [`fit_within`] with a square box, but never upscales.
///
/// Used to cap the longest edge before compression.
pub fn cap_longest_edge(source: Dimensions, max_edge: u32) -> Dimensions {
    if source.longer_edge() <= max_edge {
        return source;
    }
    fit_within(source, Dimensions::new(max_edge, max_edge))
}

/// Pixel size of a vector or PDF document rasterized at `scale`.
pub fn scaled_dimensions(width: f32, height: f32, scale: f32) -> Dimensions {
    Dimensions {
        width: round_px((width * scale) as f64),
        height: round_px((height * scale) as f64),
    }
}

/// `round((1 - new/original) * 100)`. Negative when the output grew.
pub fn compression_ratio_percent(original_size: u64, new_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    ((1.0 - new_size as f64 / original_size as f64) * 100.0).round() as i64
}
