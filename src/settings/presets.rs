//! Built-in compression presets and format advice.

use serde::{Deserialize, Serialize};
use crate::utils::ImageFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    Web,
    Print,
    Archive,
    Custom,
}

impl PresetMode {
    pub const ALL: [PresetMode; 4] = [Self::Web, Self::Print, Self::Archive, Self::Custom];

    pub fn preset(&self) -> &'static Preset {
        match self {
            Self::Web => &WEB,
            Self::Print => &PRINT,
            Self::Archive => &ARCHIVE,
            Self::Custom => &CUSTOM,
        }
    }
}

/// A named bundle of quality, max dimension and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub quality: u8,
    pub max_dimension: Option<u32>,
    pub format: Option<ImageFormat>,
    pub description: &'static str,
}

impl Preset {
    /// Tooltip line: name, description, quality, then the size cap when set,
    /// e.g. `Archive • Maximum compression for long-term storage. • 60% quality • 2048px max`.
    pub fn summary(&self) -> String {
        let mut summary = format!("{} • {} • {}% quality", self.name, self.description, self.quality);
        if let Some(max) = self.max_dimension {
            summary.push_str(&format!(" • {max}px max"));
        }
        summary
    }
}

static WEB: Preset = Preset {
    name: "Web Optimized",
    quality: 75,
    max_dimension: Some(1920),
    format: Some(ImageFormat::WebP),
    description: "Perfect for websites and web apps. Balanced quality and size.",
};

static PRINT: Preset = Preset {
    name: "Print Quality",
    quality: 90,
    max_dimension: None,
    format: None,
    description: "High quality for printing. Minimal compression.",
};

static ARCHIVE: Preset = Preset {
    name: "Archive",
    quality: 60,
    max_dimension: Some(2048),
    format: Some(ImageFormat::WebP),
    description: "Maximum compression for long-term storage.",
};

static CUSTOM: Preset = Preset {
    name: "Custom",
    quality: 80,
    max_dimension: None,
    format: None,
    description: "Configure your own settings.",
};

/// Advice shown next to a source format.
pub fn format_recommendation(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("WebP recommended for 25-35% better compression"),
        "image/png" => Some("WebP or AVIF recommended for transparent images"),
        "image/webp" => Some("Already using modern format!"),
        "image/avif" => Some("Already using the most modern format!"),
        "image/gif" => Some("Consider WebP for animations or PNG for static"),
        _ => None,
    }
}

/// WebP keeps transparency and animation and beats JPEG, so it wins everywhere.
pub fn recommended_format(_mime: &str) -> ImageFormat {
    ImageFormat::WebP
}
