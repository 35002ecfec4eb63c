//! The uniform result every transform returns.
//!
//! A [`TransformResult`] is built once per invocation and never changes
//! afterwards. It owns the encoded payload; the pipeline keeps no reference
//! to it.
//!
//! ## Ephemeral previews
//!
//! [`TransformResult::publish`] materialises the payload as a temp file and
//! hands back a [`Preview`] with a `file://` URL. The caller owns the
//! preview: call [`Preview::release`] when done (dropping it also removes the
//! file, but silently ignores errors). The pipeline does not track issued
//! previews.

use crate::naming::disambiguate;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Mode-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ModeDetails {
    Convert,
    Compress {
        /// `round((1 - new/original) * 100)`, negative if the output grew.
        compression_ratio_percent: i64,
    },
    Resize {
        original_width: u32,
        original_height: u32,
        new_width: u32,
        new_height: u32,
    },
    Crop {
        original_width: u32,
        original_height: u32,
        new_width: u32,
        new_height: u32,
    },
    RemoveBackground,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    #[serde(skip)]
    payload: Vec<u8>,
    media_type: String,
    file_name: String,
    original_size: u64,
    new_size: u64,
    #[serde(flatten)]
    details: ModeDetails,
}

impl TransformResult {
    pub(crate) fn new(
        payload: Vec<u8>,
        media_type: impl Into<String>,
        file_name: String,
        original_size: u64,
        details: ModeDetails,
    ) -> Self {
        let new_size = payload.len() as u64;
        Self {
            payload,
            media_type: media_type.into(),
            file_name,
            original_size,
            new_size,
            details,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the encoded bytes.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Suggested output filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn new_size(&self) -> u64 {
        self.new_size
    }

    pub fn details(&self) -> &ModeDetails {
        &self.details
    }

    /// Write the payload into `dir` as `name`.
    ///
    /// An existing file is replaced only when `overwrite` is set; otherwise
    /// the write fails with [`std::io::ErrorKind::AlreadyExists`].
    pub fn save_in(&self, dir: &Path, name: &str, overwrite: bool) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(name);
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(&path)?;
        file.write_all(&self.payload)?;
        Ok(path)
    }

    /// Materialise the payload as an ephemeral file the caller must release.
    pub fn publish(&self) -> std::io::Result<Preview> {
        let mut file = tempfile::Builder::new()
            .prefix("pixelsmith-")
            .suffix(&format!("-{}", self.file_name))
            .tempfile()?;
        file.write_all(&self.payload)?;
        file.flush()?;
        Ok(Preview { file })
    }
}

/// Save a batch of results into `dir`.
///
/// Names that collide within the batch are numbered (see
/// [`disambiguate`]), so no result overwrites another. Outcomes come back in
/// input order.
pub fn save_all<'a>(
    results: impl IntoIterator<Item = &'a TransformResult>,
    dir: &Path,
    overwrite: bool,
) -> Vec<std::io::Result<PathBuf>> {
    let results: Vec<&TransformResult> = results.into_iter().collect();
    let names = disambiguate(results.iter().map(|r| r.file_name()));
    results
        .iter()
        .zip(&names)
        .map(|(result, name)| {
            if name != result.file_name() {
                warn!(from = result.file_name(), to = %name, "Renamed duplicate output");
            }
            result.save_in(dir, name, overwrite)
        })
        .collect()
}

/// An ephemeral on-disk copy of a result's payload.
#[derive(Debug)]
pub struct Preview {
    file: NamedTempFile,
}

impl Preview {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.file.path().display())
    }

    /// Delete the backing file, reporting any error.
    pub fn release(self) -> std::io::Result<()> {
        self.file.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransformResult {
        TransformResult::new(
            vec![1, 2, 3, 4],
            "image/png",
            "photo_no-bg.png".to_string(),
            10,
            ModeDetails::RemoveBackground,
        )
    }

    #[test]
    fn new_size_is_payload_length() {
        let r = sample();
        assert_eq!(r.new_size(), 4);
        assert_eq!(r.original_size(), 10);
    }

    #[test]
    fn serializes_without_payload() {
        let r = TransformResult::new(
            vec![0; 25],
            "image/jpeg",
            "a.jpg".to_string(),
            100,
            ModeDetails::Compress {
                compression_ratio_percent: 75,
            },
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "compress");
        assert_eq!(json["compression_ratio_percent"], 75);
        assert_eq!(json["new_size"], 25);
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn resize_details_serialize_flat() {
        let r = TransformResult::new(
            vec![0; 4],
            "image/png",
            "a_2x1.png".to_string(),
            8,
            ModeDetails::Resize {
                original_width: 4,
                original_height: 2,
                new_width: 2,
                new_height: 1,
            },
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "resize");
        assert_eq!(json["new_width"], 2);
    }

    #[test]
    fn publish_and_release_preview() {
        let r = sample();
        let preview = r.publish().unwrap();
        let path = preview.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
        assert!(preview.url().starts_with("file://"));
        assert!(path.to_string_lossy().ends_with("photo_no-bg.png"));

        preview.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn save_in_creates_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let r = sample();
        let path = r.save_in(&tmp.path().join("out"), r.file_name(), false).unwrap();
        assert_eq!(path.file_name().unwrap(), "photo_no-bg.png");
        assert_eq!(std::fs::read(path).unwrap().len(), 4);
    }

    #[test]
    fn save_in_refuses_to_clobber() {
        let tmp = tempfile::TempDir::new().unwrap();
        let existing = tmp.path().join("photo_no-bg.png");
        std::fs::write(&existing, b"first").unwrap();

        let err = sample()
            .save_in(tmp.path(), "photo_no-bg.png", false)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&existing).unwrap(), b"first");
    }

    #[test]
    fn save_in_overwrites_when_asked() {
        let tmp = tempfile::TempDir::new().unwrap();
        let existing = tmp.path().join("photo_no-bg.png");
        std::fs::write(&existing, b"a much longer previous payload").unwrap();

        sample().save_in(tmp.path(), "photo_no-bg.png", true).unwrap();
        assert_eq!(std::fs::read(&existing).unwrap(), vec![1, 2, 3, 4]);
    }
}
