//! Shared test utilities for the pixelsmith test suite.
//!
//! Provides synthetic image fixtures and small encoders so tests never need
//! binary files on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = png_bytes(&gradient_rgba(64, 48));
//! let file = source("photo.png", "image/png", png);
//! let err = pipeline.resize(&file, &opts).unwrap_err();
//! ```

use crate::types::SourceFile;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Pixel fixtures
// =========================================================================

/// Opaque gradient: red across, green down, constant blue.
pub fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgba([r, g, 128, 255])
    })
}

/// Opaque pseudo-random noise. Deterministic, and compresses badly, which is
/// what size-constraint tests want.
pub fn noise_rgba(width: u32, height: u32) -> RgbaImage {
    let mut state: u32 = 0x2545_f491;
    RgbaImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgba([next(), next(), next(), 255])
    })
}

// =========================================================================
// Encoders
// =========================================================================

fn encode_as(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    let dynamic = DynamicImage::ImageRgba8(img.clone());
    match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(dynamic.to_rgb8())
            .write_to(&mut buf, format)
            .unwrap(),
        _ => dynamic.write_to(&mut buf, format).unwrap(),
    }
    buf.into_inner()
}

pub fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    encode_as(img, ImageFormat::Png)
}

pub fn jpeg_bytes(img: &RgbaImage) -> Vec<u8> {
    encode_as(img, ImageFormat::Jpeg)
}

// =========================================================================
// Source files
// =========================================================================

pub fn source(name: &str, media_type: &str, bytes: Vec<u8>) -> SourceFile {
    SourceFile::new(name, media_type, bytes)
}

/// A `width`×`height` gradient PNG named `name`.
pub fn png_source(name: &str, width: u32, height: u32) -> SourceFile {
    source(name, "image/png", png_bytes(&gradient_rgba(width, height)))
}
