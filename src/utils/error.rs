//! Error types for the image compressor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;
use serde::Serialize;
use crate::core::JobId;

/// Validation errors for incoming files and settings.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// The file's MIME type is not `image/*`
    #[error("Not an image file")]
    NotAnImage { mime: String },
    /// The file exceeds the configured size limit
    #[error("File too large (max {}MB)", .max / 1024 / 1024)]
    TooLarge { size: u64, max: u64 },
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Main error type for the compressor.
///
/// Every failure is scoped to one job or one operation; none of them is
/// fatal to the owning [`AppState`](crate::core::AppState).
#[derive(Error, Debug, Clone, Serialize)]
pub enum CompressorError {
    /// Input or settings validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The compression backend failed
    #[error("{0}")]
    Compression(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Archive or download delivery failed
    #[error("Export error: {0}")]
    Export(String),

    /// Preference storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote import failed
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unknown job: {0}")]
    NotFound(JobId),

    /// Retry cap reached for a job
    #[error("Maximum retry attempts reached")]
    RetryLimit { id: JobId, attempts: u32 },

    #[error("No images selected")]
    NothingSelected,

    #[error("No compressed images to export")]
    NothingToExport,
}

/// Convenience result type for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

// Helper methods for error creation
impl CompressorError {
    pub fn compression<T: Into<String>>(msg: T) -> Self {
        Self::Compression(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn export<T: Into<String>>(msg: T) -> Self {
        Self::Export(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage(msg.into())
    }

    pub fn network<T: Into<String>>(msg: T) -> Self {
        Self::Network(msg.into())
    }
}

impl ValidationError {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert std::io::Error to CompressorError
impl From<io::Error> for CompressorError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<image::ImageError> for CompressorError {
    fn from(err: image::ImageError) -> Self {
        Self::Compression(err.to_string())
    }
}

impl From<zip::result::ZipError> for CompressorError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<serde_json::Error> for CompressorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for CompressorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
