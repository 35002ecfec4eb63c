//! Shared types passed between the caller and the transform pipeline.
//!
//! Every value here is created fresh per invocation. Nothing is cached or
//! shared between calls, so a caller can run any number of transforms in
//! parallel over the same [`Pipeline`](crate::pipeline::Pipeline).

use crate::imaging::detect::media_type_for_name;
use crate::imaging::{CompressionLevel, Quality, ScaleFactor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An input file: encoded bytes plus the declared media type and filename.
///
/// The pipeline only ever borrows a `SourceFile`; it never mutates or
/// persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl SourceFile {
    /// Wrap bytes with an explicit media type (may be empty when unknown).
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its media type from the extension.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_for_name(&name).unwrap_or_default().to_string();
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output encodings the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Png,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    Webp,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Png, TargetFormat::Jpeg, TargetFormat::Webp];

    /// Extension used for derived output filenames.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Whether the encoding carries a transparency channel.
    ///
    /// Surfaces for encodings without alpha are painted opaque white first.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    /// Lossy encodings honour [`Quality`]; PNG ignores it.
    pub fn is_lossy(self) -> bool {
        !matches!(self, Self::Png)
    }

    /// Map a declared media type back to a target format, if it is one.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unsupported output format: {other} (expected png, jpg or webp)")),
        }
    }
}

/// Options shared by convert, resize and background removal.
///
/// `quality` is clamped to `[0, 1]` by [`Quality::new`]; callers can pass
/// any value and the pipeline will never see one out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionOptions {
    pub target_format: TargetFormat,
    pub quality: Quality,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
    /// Rasterization scale for vector and PDF input.
    pub scale_factor: ScaleFactor,
}

impl ConversionOptions {
    pub fn new(target_format: TargetFormat) -> Self {
        Self {
            target_format,
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Quality::new(quality);
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_aspect_lock(mut self, locked: bool) -> Self {
        self.maintain_aspect_ratio = locked;
        self
    }

    pub fn with_scale_factor(mut self, scale: f32) -> Self {
        self.scale_factor = ScaleFactor::new(scale);
        self
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_format: TargetFormat::Png,
            quality: Quality::default(),
            width: None,
            height: None,
            maintain_aspect_ratio: true,
            scale_factor: ScaleFactor::default(),
        }
    }
}

/// Options for the compress operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressOptions {
    pub level: CompressionLevel,
    /// Output encoding; `None` keeps the input's encoding when possible.
    pub target_format: Option<TargetFormat>,
}
