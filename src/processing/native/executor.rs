//! Native compressor built on the `image` crate.
//!
//! Each image is decoded, resized and encoded inside
//! `tokio::task::spawn_blocking`, so the async runtime is never blocked
//! while the batch coordinator keeps draining progress reports.

use std::io::Cursor;
use std::sync::Arc;
use async_trait::async_trait;
use image::{DynamicImage, ImageReader};
use tracing::debug;
use crate::core::{CompressionSettings, Dimensions, SourceFile};
use crate::processing::driver::{CompressedImage, Compressor, ProgressSender};
use crate::utils::{CompressorError, CompressorResult, ImageFormat};

use super::formats::encode_as;
use super::resize::fit_within;

/// Compressor that processes images in-process with no external tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompressor;

impl NativeCompressor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Compressor for NativeCompressor {
    async fn compress(
        &self,
        source: Arc<SourceFile>,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> CompressorResult<CompressedImage> {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || compress_single(&source, &settings, &progress))
            .await
            .map_err(|e| CompressorError::compression(format!("Task panicked: {e}")))?
    }
}

// ── Blocking image processing (runs on tokio's blocking thread pool) ──────────────────

fn compress_single(
    source: &SourceFile,
    settings: &CompressionSettings,
    progress: &ProgressSender,
) -> CompressorResult<CompressedImage> {
    progress.report(10.0);

    let (image, detected) = decode(source)?;
    progress.report(40.0);

    debug!(
        "Loaded '{}': {}×{}",
        source.name(),
        image.width(),
        image.height()
    );

    if settings.preserve_metadata {
        debug!("Metadata preservation requested for '{}'; the native encoder strips it", source.name());
    }

    let image = fit_within(image, settings.max_dimension);
    progress.report(60.0);

    let format = resolve_output_format(source, detected, settings.output_format);
    let data = encode_as(&image, format, settings.quality)?;
    progress.report(90.0);

    Ok(CompressedImage {
        data,
        format,
        dimensions: Some(Dimensions::new(image.width(), image.height())),
    })
}

fn decode(source: &SourceFile) -> CompressorResult<(DynamicImage, Option<ImageFormat>)> {
    let reader = ImageReader::new(Cursor::new(source.data()))
        .with_guessed_format()
        .map_err(|e| CompressorError::compression(format!("Failed to read '{}': {e}", source.name())))?;
    let detected = reader.format().and_then(ImageFormat::from_codec);

    let image = reader
        .decode()
        .map_err(|e| CompressorError::compression(format!("Failed to load '{}': {e}", source.name())))?;

    Ok((image, detected))
}

/// Requested format first, then the sniffed source format, then the MIME
/// type; sources we cannot write back fall back to PNG.
fn resolve_output_format(
    source: &SourceFile,
    detected: Option<ImageFormat>,
    requested: Option<ImageFormat>,
) -> ImageFormat {
    requested
        .or(detected)
        .or_else(|| ImageFormat::from_mime(source.mime()))
        .unwrap_or(ImageFormat::PNG)
}
