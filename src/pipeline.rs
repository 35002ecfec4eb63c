//! Transform orchestrators.
//!
//! Each public method on [`Pipeline`] is one terminal pass:
//!
//! ```text
//! detect → decode → (resolve size) → composite → encode → TransformResult
//! ```
//!
//! | Operation | Accepts | Decode | Size | Output name |
//! |---|---|---|---|---|
//! | [`convert`](Pipeline::convert) | raster, vector, PDF, HEIC | per [`FormatKind`] | natural | `photo.webp` |
//! | [`compress`](Pipeline::compress) | raster | compressor collaborator | capped | `photo.jpg` |
//! | [`resize`](Pipeline::resize) | raster | `image` | resolved | `photo_400x300.png` |
//! | [`remove_background`](Pipeline::remove_background) | raster | segmenter collaborator | natural | `photo_no-bg.png` |
//! | [`crop`](Pipeline::crop) | raster | cropper collaborator | selection | `photo_120x80.png` |
//!
//! Nothing is retried and nothing is cached. A failure is terminal for that
//! call and always comes back as a [`TransformError`]; lower-level errors are
//! attached as the source, never returned bare.
//!
//! PDF input renders page 1 only. Later pages are dropped silently.

use crate::config::PipelineConfig;
use crate::imaging::calculations::compression_ratio_percent;
use crate::imaging::encode::{EncodeError, encode};
use crate::imaging::surface::composite;
use crate::imaging::{
    Capabilities, CapabilityError, CompressionRequest, CropRegion, CroppedImage, Dimensions,
    FormatKind, GeometryError, Quality, SizeRequest, detect, resolve_dimensions,
};
use crate::naming::{NameTag, output_file_name};
use crate::result::{ModeDetails, TransformResult};
use crate::types::{CompressOptions, ConversionOptions, SourceFile, TargetFormat};
use image::DynamicImage;
use std::fmt;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// The five public operations, for error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Convert,
    Compress,
    Resize,
    RemoveBackground,
    Crop,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Convert => "convert",
            Self::Compress => "compress",
            Self::Resize => "resize",
            Self::RemoveBackground => "remove-background",
            Self::Crop => "crop",
        })
    }
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{operation} cannot handle {name} (declared type {media_type:?})")]
    UnsupportedFormat {
        operation: Operation,
        name: String,
        media_type: String,
    },
    #[error("could not decode image: {source}")]
    DecodeFailed {
        #[source]
        source: image::ImageError,
    },
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
    #[error("encoding failed: {0}")]
    EncodingFailed(#[from] EncodeError),
    #[error("{capability} failed: {source}")]
    CollaboratorFailed {
        capability: &'static str,
        #[source]
        source: CapabilityError,
    },
}

fn unsupported(file: &SourceFile, operation: Operation) -> TransformError {
    TransformError::UnsupportedFormat {
        operation,
        name: file.name().to_string(),
        media_type: file.media_type().to_string(),
    }
}

fn collaborator(capability: &'static str) -> impl FnOnce(CapabilityError) -> TransformError {
    move |source| {
        warn!(capability, error = %source, "Collaborator failed");
        TransformError::CollaboratorFailed { capability, source }
    }
}

fn decode_raster(bytes: &[u8]) -> Result<DynamicImage, TransformError> {
    image::load_from_memory(bytes).map_err(|source| TransformError::DecodeFailed { source })
}

fn natural_size(img: &DynamicImage) -> Dimensions {
    Dimensions::new(img.width(), img.height())
}

/// Composite onto a surface of `target` and encode it.
fn render(
    img: &DynamicImage,
    target: Dimensions,
    format: TargetFormat,
    quality: Quality,
) -> Result<Vec<u8>, TransformError> {
    let surface = composite(img, target, format)?;
    Ok(encode(&surface, format, quality)?)
}

/// Reject an empty payload from a collaborator that encodes on our behalf.
fn non_empty(payload: Vec<u8>, format: TargetFormat) -> Result<Vec<u8>, TransformError> {
    if payload.is_empty() {
        return Err(EncodeError::Empty { format }.into());
    }
    Ok(payload)
}

/// Stateless transform pipeline. Safe to share across threads; every call
/// is independent.
#[derive(Clone)]
pub struct Pipeline {
    capabilities: Capabilities,
    config: PipelineConfig,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Pipeline with the production collaborators.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            capabilities: Capabilities::production(&config),
            config,
        }
    }

    /// Pipeline with caller-supplied collaborators.
    pub fn with_capabilities(config: PipelineConfig, capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn classify(&self, file: &SourceFile) -> FormatKind {
        let kind = detect(file);
        debug!(%kind, media_type = file.media_type(), "Detected input format");
        kind
    }

    fn require_raster(&self, file: &SourceFile, operation: Operation) -> Result<(), TransformError> {
        match self.classify(file) {
            FormatKind::Raster => Ok(()),
            FormatKind::Vector | FormatKind::Heic | FormatKind::Pdf | FormatKind::Unsupported => {
                Err(unsupported(file, operation))
            }
        }
    }

    fn finish(
        &self,
        file: &SourceFile,
        payload: Vec<u8>,
        format: TargetFormat,
        tag: NameTag,
        details: ModeDetails,
    ) -> TransformResult {
        let result = TransformResult::new(
            payload,
            format.media_type(),
            output_file_name(file.name(), format, tag),
            file.size(),
            details,
        );
        info!(
            output = result.file_name(),
            original_size = result.original_size(),
            new_size = result.new_size(),
            "Transform complete"
        );
        result
    }

    /// Re-encode any supported input at its natural size.
    ///
    /// Width and height in `options` are ignored. Vector and PDF input is
    /// rasterized at `options.scale_factor`.
    #[instrument(skip_all, fields(file = file.name(), format = %options.target_format))]
    pub fn convert(
        &self,
        file: &SourceFile,
        options: &ConversionOptions,
    ) -> Result<TransformResult, TransformError> {
        let format = options.target_format;
        let payload = match self.classify(file) {
            FormatKind::Raster => {
                let img = decode_raster(file.bytes())?;
                render(&img, natural_size(&img), format, options.quality)?
            }
            FormatKind::Vector => {
                let img = self
                    .capabilities
                    .vector
                    .rasterize_vector(file.bytes(), options.scale_factor)
                    .map_err(collaborator("vector rasterizer"))?;
                render(&img, natural_size(&img), format, options.quality)?
            }
            FormatKind::Pdf => {
                let img = self
                    .capabilities
                    .pdf
                    .render_first_page(file.bytes(), options.scale_factor)
                    .map_err(collaborator("PDF renderer"))?;
                render(&img, natural_size(&img), format, options.quality)?
            }
            FormatKind::Heic => {
                let blob = self
                    .capabilities
                    .heic
                    .decode_heic(file.bytes(), format, options.quality)
                    .map_err(collaborator("HEIC decoder"))?;
                non_empty(blob, format)?
            }
            FormatKind::Unsupported => return Err(unsupported(file, Operation::Convert)),
        };
        Ok(self.finish(file, payload, format, NameTag::None, ModeDetails::Convert))
    }

    /// Shrink a raster image towards the byte budget of `options.level`.
    ///
    /// The budget is a best-effort hint handed to the compressor collaborator.
    /// Without an explicit format the input's own encoding is kept when it
    /// is PNG, JPEG or WebP, and JPEG is used otherwise.
    #[instrument(skip_all, fields(file = file.name(), level = options.level.value()))]
    pub fn compress(
        &self,
        file: &SourceFile,
        options: &CompressOptions,
    ) -> Result<TransformResult, TransformError> {
        self.require_raster(file, Operation::Compress)?;
        let format = options
            .target_format
            .or_else(|| TargetFormat::from_media_type(file.media_type()))
            .unwrap_or(TargetFormat::Jpeg);

        let step = self.config.compression_step(options.level);
        let request = CompressionRequest {
            max_size_bytes: step.max_size_bytes(),
            max_dimension: self.config.compress.max_dimension,
            quality: Quality::new(step.quality),
            format,
        };
        debug!(?request, "Compressing");

        let payload = self
            .capabilities
            .compressor
            .compress_to_constraint(file.bytes(), &request)
            .map_err(collaborator("compressor"))?;
        let payload = non_empty(payload, format)?;

        let ratio = compression_ratio_percent(file.size(), payload.len() as u64);
        Ok(self.finish(
            file,
            payload,
            format,
            NameTag::None,
            ModeDetails::Compress {
                compression_ratio_percent: ratio,
            },
        ))
    }

    /// Resize a raster image to the box in `options`.
    #[instrument(skip_all, fields(file = file.name(), width = ?options.width, height = ?options.height))]
    pub fn resize(
        &self,
        file: &SourceFile,
        options: &ConversionOptions,
    ) -> Result<TransformResult, TransformError> {
        self.require_raster(file, Operation::Resize)?;
        let img = decode_raster(file.bytes())?;
        let natural = natural_size(&img);
        let target = resolve_dimensions(
            natural,
            &SizeRequest {
                width: options.width,
                height: options.height,
                maintain_aspect_ratio: options.maintain_aspect_ratio,
            },
        )?;
        debug!(
            from_w = natural.width,
            from_h = natural.height,
            to_w = target.width,
            to_h = target.height,
            "Resolved target size"
        );

        let format = options.target_format;
        let payload = render(&img, target, format, options.quality)?;
        Ok(self.finish(
            file,
            payload,
            format,
            NameTag::Size(target),
            ModeDetails::Resize {
                original_width: natural.width,
                original_height: natural.height,
                new_width: target.width,
                new_height: target.height,
            },
        ))
    }

    /// Make the background of a raster image transparent.
    ///
    /// The segmenter always returns PNG. Any other target format is
    /// re-encoded from it, which for JPEG means a white background.
    #[instrument(skip_all, fields(file = file.name(), format = %options.target_format))]
    pub fn remove_background(
        &self,
        file: &SourceFile,
        options: &ConversionOptions,
    ) -> Result<TransformResult, TransformError> {
        self.require_raster(file, Operation::RemoveBackground)?;
        let segmented = self
            .capabilities
            .segmenter
            .segment_foreground(file.bytes())
            .map_err(collaborator("background segmenter"))?;

        let format = options.target_format;
        let payload = match format {
            TargetFormat::Png => non_empty(segmented, format)?,
            TargetFormat::Jpeg | TargetFormat::Webp => {
                let img = decode_raster(&segmented)?;
                render(&img, natural_size(&img), format, options.quality)?
            }
        };
        Ok(self.finish(
            file,
            payload,
            format,
            NameTag::NoBackground,
            ModeDetails::RemoveBackground,
        ))
    }

    /// Wrap a selection cropped elsewhere into a result.
    ///
    /// `cropped.bytes` must already be encoded as `format`. Only the source's
    /// header is read, to report its original dimensions.
    #[instrument(skip_all, fields(file = file.name(), width = cropped.width, height = cropped.height))]
    pub fn crop(
        &self,
        file: &SourceFile,
        cropped: CroppedImage,
        format: TargetFormat,
    ) -> Result<TransformResult, TransformError> {
        self.require_raster(file, Operation::Crop)?;
        let original = image::ImageReader::new(Cursor::new(file.bytes()))
            .with_guessed_format()
            .map_err(|e| TransformError::DecodeFailed { source: e.into() })?
            .into_dimensions()
            .map_err(|source| TransformError::DecodeFailed { source })?;

        if cropped.width == 0 {
            return Err(GeometryError::ZeroRequest { axis: "width" }.into());
        }
        if cropped.height == 0 {
            return Err(GeometryError::ZeroRequest { axis: "height" }.into());
        }
        let selection = Dimensions::new(cropped.width, cropped.height);
        let payload = non_empty(cropped.bytes, format)?;

        Ok(self.finish(
            file,
            payload,
            format,
            NameTag::Size(selection),
            ModeDetails::Crop {
                original_width: original.0,
                original_height: original.1,
                new_width: selection.width,
                new_height: selection.height,
            },
        ))
    }

    /// Crop `region` out of a raster image with the cropper collaborator.
    #[instrument(skip_all, fields(file = file.name(), ?region))]
    pub fn crop_region(
        &self,
        file: &SourceFile,
        region: &CropRegion,
        options: &ConversionOptions,
    ) -> Result<TransformResult, TransformError> {
        self.require_raster(file, Operation::Crop)?;
        let format = options.target_format;
        let cropped = self
            .capabilities
            .cropper
            .crop(file.bytes(), region, format, options.quality)
            .map_err(collaborator("cropper"))?;
        self.crop(file, cropped, format)
    }
}
