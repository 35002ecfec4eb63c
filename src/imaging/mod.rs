//! Image processing building blocks.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Detect** | [`detect`] | filename + declared media type rules |
//! | **Decode (raster)** | orchestrators | `image::load_from_memory` |
//! | **Decode (SVG)** | [`svg`] | `resvg` + `tiny-skia` |
//! | **Decode (PDF)** | [`pdf`] | `pdfium-render` (feature `pdf`) |
//! | **Decode (HEIC)** | [`heic`] | `libheif-rs` (feature `heic`) |
//! | **Resolve size** | [`calculations`] | pure arithmetic |
//! | **Composite** | [`surface`] | `image::imageops::resize` (Lanczos3) |
//! | **Encode** | [`encode`] | `image` PNG/JPEG, `webp` |
//!
//! The module is split into:
//! - **Calculations / params**: pure functions and clamped value types (unit testable)
//! - **Capabilities**: collaborator traits + production implementations
//! - **Surface / encode**: the shared composite → encode tail every transform ends with

pub mod calculations;
pub mod capabilities;
pub mod compressor;
pub mod crop;
pub mod detect;
pub mod encode;
pub mod heic;
mod params;
pub mod pdf;
pub mod segment;
pub mod surface;
pub mod svg;

pub use calculations::{Dimensions, GeometryError, SizeRequest, resolve_dimensions};
pub use capabilities::{
    BackgroundSegmenter, Capabilities, CapabilityError, CompressionRequest, Compressor,
    CropRegion, CropShape, CroppedImage, Cropper, HeicDecoder, PdfRenderer, VectorRasterizer,
};
pub use detect::{FormatKind, detect};
pub use params::{
    CompressionLevel, CompressionStep, DEFAULT_COMPRESSION_LADDER, Quality, ScaleFactor,
};
