//! The adaptation boundary around a compression backend.
//!
//! A [`Compressor`] does the pixel work. The [`CompressionDriver`] wraps one
//! call with timing, output naming and preview generation, and hands the
//! result back by value. It never touches the registry; the batch
//! coordinator reflects success or failure into job state.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;
use crate::core::{CompressedArtifact, CompressionSettings, Dimensions, SourceFile};
use crate::utils::{CompressorResult, ImageFormat, compression_ratio, format_bytes};

/// Encoded output of a backend.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub dimensions: Option<Dimensions>,
}

/// Reads width and height from the image header without decoding pixels.
pub fn probe_dimensions(data: &[u8]) -> Option<Dimensions> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
        .map(|(width, height)| Dimensions::new(width, height))
}

/// An external image compression routine.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Compresses `source` according to `settings`, reporting progress in
    /// `[0, 100]` along the way.
    async fn compress(
        &self,
        source: Arc<SourceFile>,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> CompressorResult<CompressedImage>;

    /// Pixel dimensions of an encoded image, if recognisable.
    fn dimensions(&self, data: &[u8]) -> Option<Dimensions> {
        probe_dimensions(data)
    }
}

/// Progress callback handed to a [`Compressor`].
///
/// Values are clamped to `[0, 100]`. Reports after the receiver is gone are
/// dropped.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: UnboundedSender<u8>,
}

impl ProgressSender {
    pub fn channel() -> (Self, UnboundedReceiver<u8>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// A sender nobody listens to.
    pub fn detached() -> Self {
        Self::channel().0
    }

    pub fn report(&self, percent: f32) {
        let clamped = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        let _ = self.tx.send(clamped.round() as u8);
    }
}

/// Rough wall-clock estimate: half a second minimum, longer for large files
/// and low quality targets.
pub fn estimate_duration(size: u64, quality: u8) -> Duration {
    let megabytes = size as f64 / (1024.0 * 1024.0);
    let quality_factor = (100.0 - f64::from(quality)) / 50.0;
    Duration::from_secs_f64((megabytes * (1.0 + quality_factor)).max(0.5))
}

/// Output file name: the source name, or its stem with the extension of the
/// new format when the format changed.
fn output_name(source: &SourceFile, format: ImageFormat) -> String {
    let unchanged = ImageFormat::from_file_name(source.name()) == Some(format)
        || (source.extension().is_empty() && ImageFormat::from_mime(source.mime()) == Some(format));

    if unchanged {
        source.name().to_string()
    } else {
        format!("{}.{}", source.stem(), format.primary_extension())
    }
}

#[derive(Clone)]
pub struct CompressionDriver {
    compressor: Arc<dyn Compressor>,
}

impl CompressionDriver {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self { compressor }
    }

    pub fn compressor(&self) -> &Arc<dyn Compressor> {
        &self.compressor
    }

    pub fn dimensions(&self, data: &[u8]) -> Option<Dimensions> {
        self.compressor.dimensions(data)
    }

    /// Runs one compression and shapes the result into an artifact.
    pub async fn compress(
        &self,
        source: Arc<SourceFile>,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> CompressorResult<CompressedArtifact> {
        let start = Instant::now();
        let image = self
            .compressor
            .compress(Arc::clone(&source), settings, progress)
            .await?;
        let elapsed = start.elapsed();

        let dimensions = image
            .dimensions
            .or_else(|| self.compressor.dimensions(&image.data));
        let file = SourceFile::new(
            output_name(&source, image.format),
            image.format.mime_type(),
            image.data,
        );

        debug!(
            "{} compressed to {} ({} → {}, {}) in {:.2}s",
            source.name(),
            file.name(),
            format_bytes(source.size()),
            format_bytes(file.size()),
            compression_ratio(source.size(), file.size()),
            elapsed.as_secs_f64()
        );

        Ok(CompressedArtifact {
            size: file.size(),
            preview: file.to_data_uri(),
            file,
            dimensions,
            elapsed,
        })
    }
}
