//! Background removal by flood-filling from the image border.
//!
//! The background colour is taken as the mean of the four corner pixels.
//! Every pixel connected (4-neighbourhood) to the border whose channels are all
//! within `tolerance` of that colour gets alpha 0. Regions enclosed by the
//! subject keep their pixels even if they match the background colour.
//!
//! This handles product shots and scans on a plain backdrop. It is not a
//! general subject segmenter; an ML-backed [`BackgroundSegmenter`] can be
//! dropped in through [`Capabilities`](super::capabilities::Capabilities).

use super::capabilities::{BackgroundSegmenter, CapabilityError};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::collections::VecDeque;
use tracing::debug;

pub const DEFAULT_TOLERANCE: u8 = 32;

#[derive(Debug, Clone, Copy)]
pub struct EdgeFloodSegmenter {
    tolerance: u8,
}

impl EdgeFloodSegmenter {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }
}

impl Default for EdgeFloodSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

fn corner_mean(img: &RgbaImage) -> [u8; 3] {
    let (w, h) = img.dimensions();
    let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
    let mut sum = [0u32; 3];
    for (x, y) in corners {
        let p = img.get_pixel(x, y);
        for c in 0..3 {
            sum[c] += u32::from(p[c]);
        }
    }
    sum.map(|s| ((s + 2) / 4) as u8)
}

fn is_background(pixel: &Rgba<u8>, background: [u8; 3], tolerance: u8) -> bool {
    pixel[3] == 0
        || (0..3).all(|c| pixel[c].abs_diff(background[c]) <= tolerance)
}

/// Clear every background pixel reachable from the border, in place.
/// Returns the number of pixels cleared.
pub fn clear_background(img: &mut RgbaImage, tolerance: u8) -> usize {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return 0;
    }
    let background = corner_mean(img);
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut queue = VecDeque::new();
    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;

    let border = (0..w)
        .flat_map(|x| [(x, 0), (x, h - 1)])
        .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));
    for (x, y) in border {
        if !visited[idx(x, y)] && is_background(img.get_pixel(x, y), background, tolerance) {
            visited[idx(x, y)] = true;
            queue.push_back((x, y));
        }
    }

    let mut cleared = 0;
    while let Some((x, y)) = queue.pop_front() {
        img.get_pixel_mut(x, y)[3] = 0;
        cleared += 1;

        let neighbours = [
            (x.checked_sub(1), Some(y)),
            ((x + 1 < w).then_some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), (y + 1 < h).then_some(y + 1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if !visited[idx(nx, ny)] && is_background(img.get_pixel(nx, ny), background, tolerance) {
                visited[idx(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    cleared
}

impl BackgroundSegmenter for EdgeFloodSegmenter {
    fn segment_foreground(&self, image_bytes: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        let mut rgba = image::load_from_memory(image_bytes)?.to_rgba8();
        let cleared = clear_background(&mut rgba, self.tolerance);
        debug!(
            cleared,
            total = rgba.width() as u64 * rgba.height() as u64,
            "Background pixels cleared"
        );

        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([200, 0, 0, 255]);

    /// White backdrop, red ring from 5..15 with a white hole at 8..12.
    fn ring() -> RgbaImage {
        RgbaImage::from_fn(20, 20, |x, y| {
            let in_ring = (5..15).contains(&x) && (5..15).contains(&y);
            let in_hole = (8..12).contains(&x) && (8..12).contains(&y);
            if in_ring && !in_hole { RED } else { WHITE }
        })
    }

    #[test]
    fn clears_connected_backdrop() {
        let mut img = ring();
        clear_background(&mut img, DEFAULT_TOLERANCE);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(19, 19)[3], 0);
        assert_eq!(img.get_pixel(4, 10)[3], 0);
    }

    #[test]
    fn keeps_subject_and_enclosed_holes() {
        let mut img = ring();
        clear_background(&mut img, DEFAULT_TOLERANCE);
        assert_eq!(*img.get_pixel(6, 6), RED);
        assert_eq!(*img.get_pixel(10, 10), WHITE);
    }

    #[test]
    fn counts_cleared_pixels() {
        let mut img = ring();
        // 400 total - 100 ring square
        assert_eq!(clear_background(&mut img, DEFAULT_TOLERANCE), 300);
    }

    #[test]
    fn tolerance_absorbs_noise() {
        let mut img = ring();
        img.put_pixel(2, 2, Rgba([240, 250, 245, 255]));
        clear_background(&mut img, DEFAULT_TOLERANCE);
        assert_eq!(img.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn segment_outputs_png_with_alpha() {
        let out = EdgeFloodSegmenter::default()
            .segment_foreground(&png_bytes(&ring()))
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Png);
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(decoded.get_pixel(6, 6)[3], 255);
    }
}
