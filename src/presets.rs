//! Named resize targets.
//!
//! A fixed table of common social-media and display sizes. `Custom` is a
//! sentinel meaning the caller supplies width and height explicitly.

use crate::imaging::Dimensions;
use crate::types::ConversionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePreset {
    pub name: &'static str,
    /// `None` for the `Custom` sentinel.
    pub dimensions: Option<Dimensions>,
}

const fn preset(name: &'static str, width: u32, height: u32) -> ResizePreset {
    ResizePreset {
        name,
        dimensions: Some(Dimensions { width, height }),
    }
}

pub const CUSTOM: ResizePreset = ResizePreset {
    name: "Custom",
    dimensions: None,
};

pub const RESIZE_PRESETS: &[ResizePreset] = &[
    preset("Instagram Post", 1080, 1080),
    preset("Instagram Story", 1080, 1920),
    preset("Facebook Post", 1200, 630),
    preset("Facebook Cover", 820, 312),
    preset("Twitter Post", 1200, 675),
    preset("Twitter Header", 1500, 500),
    preset("LinkedIn Post", 1200, 627),
    preset("LinkedIn Banner", 1584, 396),
    preset("YouTube Thumbnail", 1280, 720),
    preset("HD 720p", 1280, 720),
    preset("Full HD 1080p", 1920, 1080),
    preset("4K UHD", 3840, 2160),
    CUSTOM,
];

/// Case-insensitive lookup by name.
pub fn find_preset(name: &str) -> Option<&'static ResizePreset> {
    let name = name.trim();
    RESIZE_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

impl ResizePreset {
    pub fn is_custom(&self) -> bool {
        self.dimensions.is_none()
    }

    /// Copy the preset's box into `options`. `Custom` leaves them untouched.
    pub fn apply(&self, options: ConversionOptions) -> ConversionOptions {
        match self.dimensions {
            Some(d) => options.with_size(Some(d.width), Some(d.height)),
            None => options,
        }
    }
}
