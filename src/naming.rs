//! Output filename derivation.
//!
//! The original extension is stripped and the output format's extension is
//! appended. Some transforms tag the stem first:
//!
//! - `photo.png` → convert to webp → `photo.webp`
//! - `photo.png` → resize/crop to 400×300 → `photo_400x300.png`
//! - `photo.png` → remove background, jpg → `photo_no-bg.jpg`

use crate::imaging::Dimensions;
use crate::types::TargetFormat;
use std::collections::HashSet;

/// Stem used when the input name is empty or nothing but an extension.
const FALLBACK_STEM: &str = "image";

/// Infix inserted between the stem and the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTag {
    None,
    /// `_{width}x{height}` for resize and crop.
    Size(Dimensions),
    /// `_no-bg` for background removal.
    NoBackground,
}

/// Strip the last extension from a filename.
///
/// - `"photo.png"` → `"photo"`
/// - `"archive.tar.gz"` → `"archive.tar"`
/// - `".hidden"` → `".hidden"` (a leading dot is not an extension)
/// - `"README"` → `"README"`
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Derive the suggested output filename for a transform result.
pub fn output_file_name(input: &str, format: TargetFormat, tag: NameTag) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let stem = match file_stem(base) {
        "" => FALLBACK_STEM,
        s => s,
    };
    let ext = format.extension();
    match tag {
        NameTag::None => format!("{stem}.{ext}"),
        NameTag::Size(d) => format!("{stem}_{}x{}.{ext}", d.width, d.height),
        NameTag::NoBackground => format!("{stem}_no-bg.{ext}"),
    }
}

/// Make every name in a batch distinct, keeping the first occurrence as-is.
///
/// Later repeats get a counter on the stem: `photo.png`, `photo_2.png`,
/// `photo_3.png`. Order matches the input.
pub fn disambiguate<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.to_string();
            let stem = file_stem(name);
            let ext = &name[stem.len()..];
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{stem}_{n}{ext}");
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_last_extension() {
        assert_eq!(file_stem("photo.png"), "photo");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn stem_keeps_dotfiles_and_bare_names() {
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn convert_swaps_extension() {
        assert_eq!(
            output_file_name("photo.png", TargetFormat::Webp, NameTag::None),
            "photo.webp"
        );
        assert_eq!(
            output_file_name("scan.PDF", TargetFormat::Jpeg, NameTag::None),
            "scan.jpg"
        );
    }

    #[test]
    fn resize_inserts_dimensions() {
        assert_eq!(
            output_file_name(
                "photo.png",
                TargetFormat::Png,
                NameTag::Size(Dimensions::new(400, 300))
            ),
            "photo_400x300.png"
        );
    }

    #[test]
    fn background_removal_inserts_tag() {
        assert_eq!(
            output_file_name("photo.png", TargetFormat::Jpeg, NameTag::NoBackground),
            "photo_no-bg.jpg"
        );
    }

    #[test]
    fn keeps_inner_dots() {
        assert_eq!(
            output_file_name("my.holiday.photo.jpeg", TargetFormat::Png, NameTag::None),
            "my.holiday.photo.png"
        );
    }

    #[test]
    fn drops_directories() {
        assert_eq!(
            output_file_name("shots/2024/photo.png", TargetFormat::Png, NameTag::None),
            "photo.png"
        );
    }

    #[test]
    fn empty_name_gets_fallback_stem() {
        assert_eq!(output_file_name("", TargetFormat::Png, NameTag::None), "image.png");
    }

    // =========================================================================
    // Batch disambiguation
    // =========================================================================

    #[test]
    fn disambiguate_numbers_repeats() {
        assert_eq!(
            disambiguate(["photo.png", "photo.png", "other.png", "photo.png"]),
            vec!["photo.png", "photo_2.png", "other.png", "photo_3.png"]
        );
    }

    #[test]
    fn disambiguate_skips_names_already_in_the_batch() {
        assert_eq!(
            disambiguate(["photo.png", "photo.png", "photo_2.png"]),
            vec!["photo.png", "photo_2.png", "photo_2_2.png"]
        );
    }

    #[test]
    fn disambiguate_handles_bare_names() {
        assert_eq!(disambiguate(["README", "README"]), vec!["README", "README_2"]);
    }
}
