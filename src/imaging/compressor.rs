//! Size-constrained re-encoding.
//!
//! Strategy, per attempt:
//! 1. cap the longest edge at `max_dimension` (never upscales)
//! 2. encode at the current quality
//! 3. if the payload is over budget, lower quality (lossy formats) until it
//!    reaches [`MIN_QUALITY`], then shrink dimensions by 10% per attempt
//!
//! The budget is best-effort: after [`MAX_ATTEMPTS`] the smallest payload
//! produced so far is returned even if it is still too large.

use super::calculations::{Dimensions, cap_longest_edge};
use super::capabilities::{CapabilityError, CompressionRequest, Compressor};
use super::encode::encode;
use super::params::Quality;
use super::surface::composite;
use tracing::debug;

const MAX_ATTEMPTS: usize = 12;
const MIN_QUALITY: f32 = 0.3;
const QUALITY_STEP: f32 = 0.85;
const SHRINK_STEP: f64 = 0.9;

#[derive(Debug, Default)]
pub struct IterativeCompressor;

impl IterativeCompressor {
    pub fn new() -> Self {
        Self
    }
}

fn shrink(dims: Dimensions) -> Dimensions {
    Dimensions {
        width: ((dims.width as f64 * SHRINK_STEP).round() as u32).max(1),
        height: ((dims.height as f64 * SHRINK_STEP).round() as u32).max(1),
    }
}

impl Compressor for IterativeCompressor {
    fn compress_to_constraint(
        &self,
        bytes: &[u8],
        request: &CompressionRequest,
    ) -> Result<Vec<u8>, CapabilityError> {
        let img = image::load_from_memory(bytes)?;
        let natural = Dimensions::new(img.width(), img.height());
        let mut dims = cap_longest_edge(natural, request.max_dimension.max(1));
        let mut quality = request.quality;
        let mut best: Option<Vec<u8>> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let surface = composite(&img, dims, request.format)
                .map_err(|e| CapabilityError::Failed(e.to_string()))?;
            let out = encode(&surface, request.format, quality)
                .map_err(|e| CapabilityError::Failed(e.to_string()))?;
            let size = out.len() as u64;
            debug!(
                attempt,
                width = dims.width,
                height = dims.height,
                quality = quality.value(),
                size,
                budget = request.max_size_bytes,
                "Compression attempt"
            );

            if best.as_ref().is_none_or(|b| out.len() < b.len()) {
                best = Some(out);
            }
            if size <= request.max_size_bytes {
                break;
            }

            if request.format.is_lossy() && quality.value() > MIN_QUALITY {
                quality = Quality::new((quality.value() * QUALITY_STEP).max(MIN_QUALITY));
            } else if dims.width > 1 || dims.height > 1 {
                dims = shrink(dims);
            } else {
                break;
            }
        }

        best.ok_or_else(|| CapabilityError::Failed("compressor produced no output".into()))
    }
}
