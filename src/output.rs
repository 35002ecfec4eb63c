//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every input file gets a header line (positional index + source name →
//! suggested output name) followed by indented context lines describing what
//! the transform did. Failures use the same header with an `Error:` line per
//! cause in the chain, so a batch listing reads top to bottom without
//! cross-referencing.
//!
//! # Output Format
//!
//! ```text
//! 001 photo.png → photo_400x300.png
//!     Resize: 1000x750 → 400x300
//!     Size: 1.2 MB → 84.1 KB
//!     Saved: out/photo_400x300.png
//! 002 notes.txt
//!     Error: resize cannot handle notes.txt (declared type "text/plain")
//!
//! Processed 2 files: 1 ok, 1 failed
//! ```
//!
//! With `--json` each file is one JSON object per line instead.
//!
//! # Architecture
//!
//! Each entry has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::presets::RESIZE_PRESETS;
use crate::result::{ModeDetails, TransformResult};
use std::error::Error;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count (binary units, one decimal).
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// One line describing the mode-specific outcome.
fn details_line(details: &ModeDetails) -> String {
    match details {
        ModeDetails::Convert => "Convert".to_string(),
        ModeDetails::Compress {
            compression_ratio_percent,
        } if *compression_ratio_percent >= 0 => {
            format!("Compress: {compression_ratio_percent}% smaller")
        }
        ModeDetails::Compress {
            compression_ratio_percent,
        } => format!("Compress: {}% larger", -compression_ratio_percent),
        ModeDetails::Resize {
            original_width,
            original_height,
            new_width,
            new_height,
        } => format!("Resize: {original_width}x{original_height} \u{2192} {new_width}x{new_height}"),
        ModeDetails::Crop {
            original_width,
            original_height,
            new_width,
            new_height,
        } => format!("Crop: {new_width}x{new_height} of {original_width}x{original_height}"),
        ModeDetails::RemoveBackground => "Remove background".to_string(),
    }
}

// ============================================================================
// Results
// ============================================================================

/// Format a successful transform.
///
/// ```text
/// 001 photo.png → photo.webp
///     Convert
///     Size: 2.0 MB → 312.4 KB
///     Saved: out/photo.webp
/// ```
pub fn format_result(
    index: usize,
    source_name: &str,
    result: &TransformResult,
    saved_to: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} \u{2192} {}",
        format_index(index),
        source_name,
        result.file_name()
    )];
    lines.push(format!("{}{}", indent(1), details_line(result.details())));
    lines.push(format!(
        "{}Size: {} \u{2192} {}",
        indent(1),
        human_size(result.original_size()),
        human_size(result.new_size())
    ));
    if let Some(path) = saved_to {
        lines.push(format!("{}Saved: {}", indent(1), path.display()));
    }
    lines
}

/// Format a failed transform, one `Error:` line per cause.
pub fn format_failure(index: usize, source_name: &str, error: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("{} {}", format_index(index), source_name)];
    lines.push(format!("{}Error: {}", indent(1), error));
    let mut cause = error.source();
    while let Some(err) = cause {
        lines.push(format!("{}Caused by: {}", indent(2), err));
        cause = err.source();
    }
    lines
}

/// Closing line of a batch run.
pub fn format_summary(ok: usize, failed: usize) -> String {
    let total = ok + failed;
    let noun = if total == 1 { "file" } else { "files" };
    format!("Processed {total} {noun}: {ok} ok, {failed} failed")
}

/// One JSON object describing a successful transform.
pub fn format_result_json(
    source_name: &str,
    result: &TransformResult,
    saved_to: Option<&Path>,
) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(result)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert("source".into(), source_name.into());
        if let Some(path) = saved_to {
            map.insert("saved_to".into(), path.display().to_string().into());
        }
    }
    serde_json::to_string(&value)
}

/// One JSON object describing a failed transform.
pub fn format_failure_json(source_name: &str, error: &dyn Error) -> String {
    serde_json::json!({
        "source": source_name,
        "error": error.to_string(),
    })
    .to_string()
}

pub fn print_result(index: usize, source_name: &str, result: &TransformResult, saved_to: Option<&Path>) {
    for line in format_result(index, source_name, result, saved_to) {
        println!("{}", line);
    }
}

pub fn print_failure(index: usize, source_name: &str, error: &dyn Error) {
    for line in format_failure(index, source_name, error) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

/// List the resize presets.
///
/// ```text
/// Instagram Post       1080x1080
/// Custom               (explicit --width/--height)
/// ```
pub fn format_presets() -> Vec<String> {
    RESIZE_PRESETS
        .iter()
        .map(|p| match p.dimensions {
            Some(d) => format!("{:<20} {}x{}", p.name, d.width, d.height),
            None => format!("{:<20} (explicit --width/--height)", p.name),
        })
        .collect()
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{CapabilityError, GeometryError};
    use crate::pipeline::{Operation, TransformError};

    fn resized() -> TransformResult {
        TransformResult::new(
            vec![0; 2048],
            "image/png",
            "photo_400x300.png".to_string(),
            3 * 1024 * 1024,
            ModeDetails::Resize {
                original_width: 1000,
                original_height: 750,
                new_width: 400,
                new_height: 300,
            },
        )
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn details_line_compress_sign() {
        assert_eq!(
            details_line(&ModeDetails::Compress {
                compression_ratio_percent: 62
            }),
            "Compress: 62% smaller"
        );
        assert_eq!(
            details_line(&ModeDetails::Compress {
                compression_ratio_percent: -5
            }),
            "Compress: 5% larger"
        );
    }

    // =========================================================================
    // Result formatting
    // =========================================================================

    #[test]
    fn result_lines() {
        let lines = format_result(1, "photo.png", &resized(), Some(Path::new("out/photo_400x300.png")));
        assert_eq!(
            lines,
            vec![
                "001 photo.png \u{2192} photo_400x300.png",
                "    Resize: 1000x750 \u{2192} 400x300",
                "    Size: 3.0 MB \u{2192} 2.0 KB",
                "    Saved: out/photo_400x300.png",
            ]
        );
    }

    #[test]
    fn result_without_save_has_no_saved_line() {
        let lines = format_result(2, "photo.png", &resized(), None);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("002 "));
    }

    #[test]
    fn failure_lists_cause_chain() {
        let err = TransformError::CollaboratorFailed {
            capability: "PDF renderer",
            source: CapabilityError::Unavailable("PDF support (rebuild with --features pdf)"),
        };
        let lines = format_failure(3, "scan.pdf", &err);
        assert_eq!(lines[0], "003 scan.pdf");
        assert!(lines[1].starts_with("    Error: PDF renderer failed"));
        assert!(lines[2].starts_with("        Caused by: not available"));
    }

    #[test]
    fn failure_without_source_is_two_lines() {
        let err = TransformError::UnsupportedFormat {
            operation: Operation::Resize,
            name: "notes.txt".to_string(),
            media_type: "text/plain".to_string(),
        };
        let lines = format_failure(1, "notes.txt", &err);
        assert_eq!(
            lines,
            vec![
                "001 notes.txt",
                "    Error: resize cannot handle notes.txt (declared type \"text/plain\")",
            ]
        );
    }

    #[test]
    fn summary_pluralises() {
        assert_eq!(format_summary(1, 0), "Processed 1 file: 1 ok, 0 failed");
        assert_eq!(format_summary(2, 1), "Processed 3 files: 2 ok, 1 failed");
    }

    // =========================================================================
    // JSON
    // =========================================================================

    #[test]
    fn result_json_has_source_and_details() {
        let json = format_result_json("photo.png", &resized(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "photo.png");
        assert_eq!(value["file_name"], "photo_400x300.png");
        assert_eq!(value["mode"], "resize");
        assert_eq!(value["new_width"], 400);
        assert!(value.get("saved_to").is_none());
    }

    #[test]
    fn failure_json_has_message() {
        let err = TransformError::InvalidGeometry(GeometryError::ZeroRequest { axis: "height" });
        let value: serde_json::Value =
            serde_json::from_str(&format_failure_json("a.png", &err)).unwrap();
        assert_eq!(value["source"], "a.png");
        assert!(value["error"].as_str().unwrap().contains("height"));
    }

    // =========================================================================
    // Presets
    // =========================================================================

    #[test]
    fn presets_list_every_entry() {
        let lines = format_presets();
        assert_eq!(lines.len(), RESIZE_PRESETS.len());
        assert!(lines[0].starts_with("Instagram Post"));
        assert!(lines[0].ends_with("1080x1080"));
        assert!(lines.last().unwrap().contains("explicit"));
    }
}
