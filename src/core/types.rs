//! Core types for compression settings and results.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::SourceFile;
use crate::utils::{CompressorResult, ImageFormat, ValidationError};

pub const DEFAULT_NAMING_PATTERN: &str = "{name}-compressed.{ext}";

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Parameters applied to every job of a batch.
///
/// The batch coordinator receives a clone taken when the batch starts, so
/// edits made while a batch is in flight only affect later batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSettings {
    /// Quality level (1-100)
    pub quality: u8,
    /// Longest allowed side in pixels; larger images are scaled down
    pub max_dimension: Option<u32>,
    /// Target format, `None` keeps the source format
    pub output_format: Option<ImageFormat>,
    /// Ask the backend to keep EXIF and other metadata
    pub preserve_metadata: bool,
    /// Output file name template
    pub naming_pattern: String,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: 75,
            max_dimension: Some(1920),
            output_format: Some(ImageFormat::WebP),
            preserve_metadata: false,
            naming_pattern: DEFAULT_NAMING_PATTERN.to_string(),
        }
    }
}

impl CompressionSettings {
    pub fn validate(&self) -> CompressorResult<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ValidationError::settings(format!(
                "Invalid quality value: {}. Must be between 1 and 100",
                self.quality
            ))
            .into());
        }

        if self.max_dimension == Some(0) {
            return Err(ValidationError::settings("Max dimension cannot be 0").into());
        }

        if self.naming_pattern.trim().is_empty() {
            return Err(ValidationError::settings("Naming pattern cannot be empty").into());
        }

        Ok(())
    }
}

/// Output of one successful compression.
#[derive(Debug, Clone)]
pub struct CompressedArtifact {
    /// The compressed file, named after the source with the output extension
    pub file: SourceFile,
    /// Compressed size in bytes
    pub size: u64,
    /// `data:` URI suitable for rendering
    pub preview: String,
    pub dimensions: Option<Dimensions>,
    /// Wall-clock time spent in the compressor
    pub elapsed: Duration,
}
