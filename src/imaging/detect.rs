//! Input format classification.
//!
//! Declared media types are often generic or missing for the exotic formats
//! (browsers and file managers report HEIC as `""` or
//! `application/octet-stream`), so the filename extension is checked first
//! for PDF and HEIC and the rules are applied in a fixed order:
//!
//! | # | Rule | Kind |
//! |---|---|---|
//! | 1 | `.pdf` or `application/pdf` | [`FormatKind::Pdf`] |
//! | 2 | `.heic`/`.heif` or a HEIC/HEIF media type | [`FormatKind::Heic`] |
//! | 3 | `image/svg+xml` or `.svg` | [`FormatKind::Vector`] |
//! | 4 | media type starting with `image/` | [`FormatKind::Raster`] |
//! | 5 | anything else | [`FormatKind::Unsupported`] |

use crate::types::SourceFile;
use std::fmt;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";
const HEIC_MEDIA_TYPES: &[&str] = &[
    "image/heic",
    "image/heif",
    "image/heic-sequence",
    "image/heif-sequence",
];

/// Extension → declared media type, used when reading files from disk.
const EXTENSION_MEDIA_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("svg", SVG_MEDIA_TYPE),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("pdf", PDF_MEDIA_TYPE),
];

/// The decode path an input file takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Vector,
    Raster,
    Heic,
    Pdf,
    Unsupported,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vector => "vector",
            Self::Raster => "raster",
            Self::Heic => "heic",
            Self::Pdf => "pdf",
            Self::Unsupported => "unsupported",
        })
    }
}

fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Media type a file with this name would be declared as, if known.
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    let ext = extension(name)?;
    EXTENSION_MEDIA_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mt)| *mt)
}

/// Classify by filename and declared media type. Pure.
pub fn classify(name: &str, media_type: &str) -> FormatKind {
    let ext = extension(name);
    let ext = ext.as_deref();
    let media_type = media_type.trim().to_ascii_lowercase();

    if ext == Some("pdf") || media_type == PDF_MEDIA_TYPE {
        FormatKind::Pdf
    } else if matches!(ext, Some("heic" | "heif")) || HEIC_MEDIA_TYPES.contains(&media_type.as_str())
    {
        FormatKind::Heic
    } else if media_type == SVG_MEDIA_TYPE || ext == Some("svg") {
        FormatKind::Vector
    } else if media_type.starts_with("image/") {
        FormatKind::Raster
    } else {
        FormatKind::Unsupported
    }
}

/// Classify a source file. Same input, same answer, no side effects.
pub fn detect(file: &SourceFile) -> FormatKind {
    classify(file.name(), file.media_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_by_extension_or_type() {
        assert_eq!(classify("doc.pdf", ""), FormatKind::Pdf);
        assert_eq!(classify("doc.PDF", ""), FormatKind::Pdf);
        assert_eq!(classify("download", "application/pdf"), FormatKind::Pdf);
    }

    #[test]
    fn heic_wins_over_generic_type() {
        assert_eq!(classify("IMG_0001.HEIC", ""), FormatKind::Heic);
        assert_eq!(
            classify("IMG_0001.heif", "application/octet-stream"),
            FormatKind::Heic
        );
        assert_eq!(classify("photo", "image/heic"), FormatKind::Heic);
    }

    #[test]
    fn heic_extension_beats_image_prefix() {
        // Rule 2 must fire before rule 4 even though the type is image/*.
        assert_eq!(classify("IMG.heic", "image/jpeg"), FormatKind::Heic);
    }

    #[test]
    fn pdf_beats_heic() {
        assert_eq!(classify("scan.pdf", "image/heic"), FormatKind::Pdf);
    }

    #[test]
    fn svg_by_type_or_extension() {
        assert_eq!(classify("logo.svg", ""), FormatKind::Vector);
        assert_eq!(classify("logo", "image/svg+xml"), FormatKind::Vector);
    }

    #[test]
    fn svg_type_beats_raster_prefix() {
        assert_eq!(classify("logo.png", "image/svg+xml"), FormatKind::Vector);
    }

    #[test]
    fn raster_by_image_prefix() {
        assert_eq!(classify("photo.png", "image/png"), FormatKind::Raster);
        assert_eq!(classify("anim.gif", "image/gif"), FormatKind::Raster);
    }

    #[test]
    fn raster_needs_declared_type() {
        // Extension alone is not enough for raster input.
        assert_eq!(classify("photo.png", ""), FormatKind::Unsupported);
    }

    #[test]
    fn text_is_unsupported() {
        assert_eq!(classify("notes.txt", "text/plain"), FormatKind::Unsupported);
        assert_eq!(classify("", ""), FormatKind::Unsupported);
    }

    #[test]
    fn detect_is_repeatable() {
        let file = SourceFile::new("logo.svg", "", b"<svg/>".to_vec());
        let first = detect(&file);
        for _ in 0..10 {
            assert_eq!(detect(&file), first);
        }
    }

    #[test]
    fn media_type_lookup() {
        assert_eq!(media_type_for_name("a.JPG"), Some("image/jpeg"));
        assert_eq!(media_type_for_name("a.heic"), Some("image/heic"));
        assert_eq!(media_type_for_name("a.txt"), None);
        assert_eq!(media_type_for_name("noext"), None);
    }

    #[test]
    fn every_extension_classifies() {
        for (ext, _) in EXTENSION_MEDIA_TYPES {
            let name = format!("file.{ext}");
            let mt = media_type_for_name(&name).unwrap();
            assert_ne!(classify(&name, mt), FormatKind::Unsupported, "{ext}");
        }
    }
}
