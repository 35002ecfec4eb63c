//! Pipeline configuration.
//!
//! Handles loading, validating, and merging a `pixelsmith.toml`. Stock
//! defaults are the base layer; a user file overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! format = "png"          # png | jpg | webp
//! quality = 0.9           # Lossy quality (0.0-1.0)
//! scale_factor = 2.0      # Vector/PDF rasterization multiplier
//!
//! [compress]
//! max_dimension = 4096    # Longest edge handed to the compressor
//! levels = [              # Level 1..5 -> size ceiling + quality
//!   { max_size_mb = 2.0, quality = 0.9 },
//!   { max_size_mb = 1.5, quality = 0.8 },
//!   { max_size_mb = 1.0, quality = 0.7 },
//!   { max_size_mb = 0.5, quality = 0.6 },
//!   { max_size_mb = 0.25, quality = 0.5 },
//! ]
//!
//! [segment]
//! tolerance = 32          # Colour distance treated as background
//!
//! [processing]
//! max_threads = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [defaults]
//! format = "webp"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    CompressionLevel, CompressionStep, DEFAULT_COMPRESSION_LADDER, Quality, ScaleFactor,
};
use crate::types::{ConversionOptions, TargetFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from a TOML file.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Defaults for convert, resize and background removal.
    pub defaults: DefaultsConfig,
    /// Compression ladder and size cap.
    pub compress: CompressConfig,
    /// Background segmentation settings.
    pub segment: SegmentConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.defaults.quality) {
            return Err(ConfigError::Validation(
                "defaults.quality must be 0.0-1.0".into(),
            ));
        }
        if !self.defaults.scale_factor.is_finite() || self.defaults.scale_factor <= 0.0 {
            return Err(ConfigError::Validation(
                "defaults.scale_factor must be positive".into(),
            ));
        }
        if self.compress.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "compress.max_dimension must be non-zero".into(),
            ));
        }
        let levels = &self.compress.levels;
        if levels.len() != usize::from(CompressionLevel::MAX) {
            return Err(ConfigError::Validation(format!(
                "compress.levels must have exactly {} entries, found {}",
                CompressionLevel::MAX,
                levels.len()
            )));
        }
        for (i, step) in levels.iter().enumerate() {
            if step.max_size_mb <= 0.0 || !(0.0..=1.0).contains(&step.quality) {
                return Err(ConfigError::Validation(format!(
                    "compress.levels[{i}] needs max_size_mb > 0 and quality 0.0-1.0"
                )));
            }
        }
        if levels
            .windows(2)
            .any(|w| w[1].max_size_mb > w[0].max_size_mb || w[1].quality > w[0].quality)
        {
            return Err(ConfigError::Validation(
                "compress.levels must not increase in size or quality from level 1 to 5".into(),
            ));
        }
        Ok(())
    }

    /// The ladder rung for `level`.
    pub fn compression_step(&self, level: CompressionLevel) -> CompressionStep {
        self.compress
            .levels
            .get(level.index())
            .copied()
            .unwrap_or(DEFAULT_COMPRESSION_LADDER[level.index()])
    }

    /// Conversion options seeded from `[defaults]`.
    pub fn conversion_defaults(&self) -> ConversionOptions {
        ConversionOptions {
            target_format: self.defaults.format,
            quality: Quality::new(self.defaults.quality),
            scale_factor: ScaleFactor::new(self.defaults.scale_factor),
            ..ConversionOptions::default()
        }
    }
}

/// Defaults applied when the caller leaves an option unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Output encoding.
    pub format: TargetFormat,
    /// Lossy encoding quality (0.0 = worst, 1.0 = best).
    pub quality: f32,
    /// Rasterization multiplier for SVG and PDF input.
    pub scale_factor: f32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: TargetFormat::Png,
            quality: Quality::DEFAULT,
            scale_factor: ScaleFactor::DEFAULT,
        }
    }
}

/// Compression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressConfig {
    /// Longest edge the compressor may emit.
    pub max_dimension: u32,
    /// Level 1..5, strongest last.
    pub levels: Vec<CompressionStep>,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            levels: DEFAULT_COMPRESSION_LADDER.to_vec(),
        }
    }
}

/// Background segmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentConfig {
    /// Per-channel colour distance from the border colour still treated as background.
    pub tolerance: u8,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            tolerance: crate::imaging::segment::DEFAULT_TOLERANCE,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for batch runs.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `levels` array replaces the whole ladder.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, or the stock defaults when `path` is `None`.
///
/// A path that is given but missing is an error.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let overlay = match path {
        Some(p) => {
            let content = fs::read_to_string(p)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pixelsmith Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Defaults for convert / resize / remove-bg
# ---------------------------------------------------------------------------
[defaults]
# Output encoding: "png", "jpg" or "webp".
format = "png"

# Lossy encoding quality (0.0 = worst, 1.0 = best). PNG ignores it.
quality = 0.9

# Multiplier applied to an SVG or PDF page's natural size when rasterizing.
scale_factor = 2.0

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compress]
# Longest edge (pixels) the compressor may emit.
max_dimension = 4096

# Level 1 (gentlest) to 5 (strongest). Sizes are best-effort targets.
# Both size and quality must not increase from one level to the next.
levels = [
  { max_size_mb = 2.0, quality = 0.9 },
  { max_size_mb = 1.5, quality = 0.8 },
  { max_size_mb = 1.0, quality = 0.7 },
  { max_size_mb = 0.5, quality = 0.6 },
  { max_size_mb = 0.25, quality = 0.5 },
]

# ---------------------------------------------------------------------------
# Background removal
# ---------------------------------------------------------------------------
[segment]
# Per-channel colour distance from the border colour still treated as
# background (0-255).
tolerance = 32

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
