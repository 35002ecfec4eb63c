//! Collaborator traits the pipeline calls through.
//!
//! Each heavy primitive (SVG rasterizer, HEIC codec, PDF renderer,
//! size-constrained compressor, background segmenter, cropper) sits behind a
//! narrow trait that speaks only bytes in, [`DynamicImage`] or bytes out. The
//! orchestrators never touch a collaborator's native types, so any of them can
//! be swapped (e.g. for a recording mock in tests) without changing
//! orchestration logic.
//!
//! | Trait | Production implementation |
//! |---|---|
//! | [`VectorRasterizer`] | [`ResvgRasterizer`](super::svg::ResvgRasterizer) |
//! | [`HeicDecoder`] | [`LibHeifDecoder`](super::heic::LibHeifDecoder) (feature `heic`) |
//! | [`PdfRenderer`] | [`PdfiumRenderer`](super::pdf::PdfiumRenderer) (feature `pdf`) |
//! | [`Compressor`] | [`IterativeCompressor`](super::compressor::IterativeCompressor) |
//! | [`BackgroundSegmenter`] | [`EdgeFloodSegmenter`](super::segment::EdgeFloodSegmenter) |
//! | [`Cropper`] | [`RegionCropper`](super::crop::RegionCropper) |

use super::compressor::IterativeCompressor;
use super::crop::RegionCropper;
use super::heic::LibHeifDecoder;
use super::params::{Quality, ScaleFactor};
use super::pdf::PdfiumRenderer;
use super::segment::EdgeFloodSegmenter;
use super::svg::ResvgRasterizer;
use crate::config::PipelineConfig;
use crate::types::TargetFormat;
use image::DynamicImage;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Failed(String),
    #[error("not available in this build: {0}")]
    Unavailable(&'static str),
}

/// Render SVG markup to a bitmap at `scale` × its natural size.
pub trait VectorRasterizer: Send + Sync {
    fn rasterize_vector(
        &self,
        markup: &[u8],
        scale: ScaleFactor,
    ) -> Result<DynamicImage, CapabilityError>;
}

/// Decode HEIC/HEIF and re-encode it in one step.
pub trait HeicDecoder: Send + Sync {
    fn decode_heic(
        &self,
        bytes: &[u8],
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CapabilityError>;
}

/// Render the first page of a PDF. There is deliberately no page argument.
pub trait PdfRenderer: Send + Sync {
    fn render_first_page(
        &self,
        bytes: &[u8],
        scale: ScaleFactor,
    ) -> Result<DynamicImage, CapabilityError>;
}

/// What a [`Compressor`] should aim for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionRequest {
    /// Best-effort ceiling, not a guarantee.
    pub max_size_bytes: u64,
    /// Longest edge allowed in the output.
    pub max_dimension: u32,
    pub quality: Quality,
    pub format: TargetFormat,
}

/// Re-encode (and downsample if needed) towards a byte budget.
pub trait Compressor: Send + Sync {
    fn compress_to_constraint(
        &self,
        bytes: &[u8],
        request: &CompressionRequest,
    ) -> Result<Vec<u8>, CapabilityError>;
}

/// Produce a PNG whose background pixels have alpha 0.
pub trait BackgroundSegmenter: Send + Sync {
    fn segment_foreground(&self, image_bytes: &[u8]) -> Result<Vec<u8>, CapabilityError>;
}

/// Shape of a crop selection. Pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropShape {
    Rectangle,
    /// Ellipse inscribed in the rectangle; outside pixels become transparent.
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub shape: CropShape,
}

/// Output of a crop collaborator, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub trait Cropper: Send + Sync {
    fn crop(
        &self,
        bytes: &[u8],
        region: &CropRegion,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<CroppedImage, CapabilityError>;
}

/// The full set of collaborators a [`Pipeline`](crate::pipeline::Pipeline) uses.
#[derive(Clone)]
pub struct Capabilities {
    pub vector: Arc<dyn VectorRasterizer>,
    pub heic: Arc<dyn HeicDecoder>,
    pub pdf: Arc<dyn PdfRenderer>,
    pub compressor: Arc<dyn Compressor>,
    pub segmenter: Arc<dyn BackgroundSegmenter>,
    pub cropper: Arc<dyn Cropper>,
}

impl Capabilities {
    /// Production collaborators configured from `config`.
    ///
    /// HEIC and PDF report [`CapabilityError::Unavailable`] unless the crate
    /// is built with the `heic` / `pdf` features.
    pub fn production(config: &PipelineConfig) -> Self {
        Self {
            vector: Arc::new(ResvgRasterizer::new()),
            heic: Arc::new(LibHeifDecoder::new()),
            pdf: Arc::new(PdfiumRenderer::new()),
            compressor: Arc::new(IterativeCompressor::new()),
            segmenter: Arc::new(EdgeFloodSegmenter::new(config.segment.tolerance)),
            cropper: Arc::new(RegionCropper::new()),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::production(&PipelineConfig::default())
    }
}
