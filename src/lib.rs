//! # Pixelsmith
//!
//! An in-process image transform pipeline. Hand it a file (raster, SVG, HEIC
//! or PDF) and options; get back one encoded image plus a small result record.
//! No network, no server, no state kept between calls.
//!
//! # Architecture: One Pass Per Call
//!
//! Every operation runs the same five steps, leaf-first:
//!
//! ```text
//! 1. Detect     name + media type   →  FormatKind   (vector/raster/heic/pdf)
//! 2. Decode     bytes               →  bitmap       (image, resvg, pdfium, ...)
//! 3. Resolve    natural + request   →  target size  (pure arithmetic)
//! 4. Composite  bitmap              →  surface      (white fill for JPEG)
//! 5. Encode     surface             →  bytes        (png / jpg / webp)
//! ```
//!
//! The orchestrators in [`pipeline`] compose these into five public
//! operations: convert, compress, resize, remove-background and crop.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrators and the [`TransformError`] taxonomy |
//! | [`imaging`] | Detection, geometry, surface, encoding, collaborator traits and their production implementations |
//! | [`types`] | Inputs: [`SourceFile`], [`TargetFormat`], [`ConversionOptions`], [`CompressOptions`] |
//! | [`result`] | [`TransformResult`] and the ephemeral [`Preview`](result::Preview) handle |
//! | [`naming`] | Output filename derivation (`photo_400x300.png`, `photo_no-bg.jpg`) |
//! | [`presets`] | Named resize targets (social media, HD) |
//! | [`config`] | `pixelsmith.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Format Dispatch
//!
//! [`FormatKind`](imaging::FormatKind) is an enum and every orchestrator
//! matches it exhaustively. Adding an input format is a compile error in every
//! place that has to handle it, not a runtime registry lookup.
//!
//! ## Collaborators Behind Narrow Traits
//!
//! The SVG rasterizer, HEIC codec, PDF renderer, compressor, background
//! segmenter and cropper each have a different native API. They sit behind
//! byte-in/bitmap-out traits in [`imaging::capabilities`] and are bundled in
//! [`Capabilities`](imaging::Capabilities). Tests swap in a recording mock;
//! the orchestrators never see a collaborator's own types.
//!
//! ## Optional System Libraries
//!
//! PDF (`pdfium-render`) and HEIC (`libheif-rs`) need native libraries and
//! are behind the `pdf` and `heic` features. Without them those inputs fail
//! with a typed error instead of the build failing.
//!
//! ## Stateless, Caller-Owned Results
//!
//! A [`Pipeline`] holds only configuration and collaborators, so it can be
//! shared across threads and called concurrently. Each [`TransformResult`]
//! owns its payload; a [`Preview`](result::Preview) temp file belongs to
//! the caller, who releases it.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod presets;
pub mod result;
pub mod types;

pub use config::PipelineConfig;
pub use pipeline::{Operation, Pipeline, TransformError};
pub use result::{ModeDetails, Preview, TransformResult};
pub use types::{CompressOptions, ConversionOptions, SourceFile, TargetFormat};

#[cfg(test)]
pub(crate) mod test_helpers;
