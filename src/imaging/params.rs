//! Parameter types for image operations.
//!
//! These describe *how much* of something an operation should do. All of
//! them clamp or validate on construction so downstream code never sees an
//! out-of-range value.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality in `[0, 1]` (default 0.9). Clamped on construction.
//! - [`ScaleFactor`]: vector/PDF rasterization multiplier (default 2).
//! - [`CompressionLevel`]: discrete compress level 1–5 (default 3).
//! - [`CompressionStep`]: the `{max_size_mb, quality}` pair a level maps to.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding, `0.0..=1.0`.
///
/// Values outside the range are clamped; NaN falls back to the default.
/// PNG output ignores quality entirely.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const DEFAULT: f32 = 0.9;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1–100 scale used by JPEG encoders.
    pub fn percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

/// Multiplier applied to a vector or PDF document's natural size when it is
/// rasterized. Higher values give sharper output at the cost of memory.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    pub const DEFAULT: f32 = 2.0;
    pub const MAX: f32 = 16.0;

    /// Non-positive and non-finite values fall back to the default.
    pub fn new(value: f32) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::default();
        }
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<f32> for ScaleFactor {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<ScaleFactor> for f32 {
    fn from(s: ScaleFactor) -> Self {
        s.0
    }
}

/// Discrete compression level: 1 keeps the most detail, 5 compresses hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Clamp to `1..=5`.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based index into a compression ladder.
    pub fn index(self) -> usize {
        usize::from(self.0 - Self::MIN)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(3)
    }
}

/// One rung of the compression ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionStep {
    /// Best-effort ceiling on the output size, in megabytes.
    pub max_size_mb: f64,
    pub quality: f32,
}

impl CompressionStep {
    pub fn max_size_bytes(&self) -> u64 {
        (self.max_size_mb * 1024.0 * 1024.0).round() as u64
    }
}

/// Stock ladder: level 1 = largest allowed size + highest quality.
pub const DEFAULT_COMPRESSION_LADDER: [CompressionStep; 5] = [
    CompressionStep {
        max_size_mb: 2.0,
        quality: 0.9,
    },
    CompressionStep {
        max_size_mb: 1.5,
        quality: 0.8,
    },
    CompressionStep {
        max_size_mb: 1.0,
        quality: 0.7,
    },
    CompressionStep {
        max_size_mb: 0.5,
        quality: 0.6,
    },
    CompressionStep {
        max_size_mb: 0.25,
        quality: 0.5,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_unit_range() {
        assert_eq!(Quality::new(-1.0).value(), 0.0);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(3.0).value(), 1.0);
    }

    #[test]
    fn quality_nan_falls_back_to_default() {
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }

    #[test]
    fn quality_percent_never_zero() {
        assert_eq!(Quality::new(0.0).percent(), 1);
        assert_eq!(Quality::new(0.855).percent(), 86);
        assert_eq!(Quality::new(1.0).percent(), 100);
    }

    #[test]
    fn scale_factor_rejects_non_positive() {
        assert_eq!(ScaleFactor::new(0.0).value(), 2.0);
        assert_eq!(ScaleFactor::new(-3.0).value(), 2.0);
        assert_eq!(ScaleFactor::new(f32::INFINITY).value(), 2.0);
        assert_eq!(ScaleFactor::new(1.5).value(), 1.5);
        assert_eq!(ScaleFactor::new(100.0).value(), ScaleFactor::MAX);
    }

    #[test]
    fn compression_level_clamps() {
        assert_eq!(CompressionLevel::new(0).value(), 1);
        assert_eq!(CompressionLevel::new(9).value(), 5);
        assert_eq!(CompressionLevel::new(1).index(), 0);
        assert_eq!(CompressionLevel::new(5).index(), 4);
    }

    #[test]
    fn stock_ladder_is_monotonic() {
        for pair in DEFAULT_COMPRESSION_LADDER.windows(2) {
            assert!(pair[0].quality >= pair[1].quality);
            assert!(pair[0].max_size_mb >= pair[1].max_size_mb);
        }
    }

    #[test]
    fn step_size_in_bytes() {
        let step = CompressionStep {
            max_size_mb: 0.5,
            quality: 0.6,
        };
        assert_eq!(step.max_size_bytes(), 524_288);
    }
}
