//! Maps the quality setting to format-specific encoder options.

use std::io::Cursor;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use crate::utils::{CompressorError, CompressorResult, ImageFormat};

// AVIF encoder speed (1 slowest .. 10 fastest)
const AVIF_SPEED: u8 = 8;
// Below this quality PNG trades encode time for size
const PNG_BEST_BELOW: u8 = 90;
// WebP switches to its lossless encoder at this quality
const LOSSLESS_QUALITY: u8 = 100;

type Result<T> = CompressorResult<T>;

/// Encodes as JPEG at `quality`. Alpha is flattened away.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CompressorError::compression(format!("JPEG save failed: {e}")))?;
    Ok(buf)
}

/// Encodes as PNG. PNG is lossless, so quality only picks the compression
/// effort.
pub fn encode_png(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let compression = if quality < PNG_BEST_BELOW {
        CompressionType::Best
    } else {
        CompressionType::Default
    };
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive);

    let result = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        encoder.write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
    } else {
        let rgb = image.to_rgb8();
        encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
    };
    result.map_err(|e| CompressorError::compression(format!("PNG save failed: {e}")))?;
    Ok(buf)
}

/// Encodes as WebP. Quality 100 is lossless, anything lower goes through
/// libwebp's lossy encoder at that quality.
pub fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    if quality >= LOSSLESS_QUALITY {
        let mut buf = Vec::new();
        WebPEncoder::new_lossless(&mut buf)
            .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
            .map_err(|e| CompressorError::compression(format!("WebP save failed: {e}")))?;
        return Ok(buf);
    }

    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, f32::from(quality))
        .map_err(|e| CompressorError::compression(format!("WebP save failed: {e:?}")))?;
    Ok(encoded.to_vec())
}

/// Encodes as AVIF at `quality`.
pub fn encode_avif(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buf = Vec::new();
    AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, quality)
        .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
        .map_err(|e| CompressorError::compression(format!("AVIF save failed: {e}")))?;
    Ok(buf)
}

/// Formats without quality knobs go through the generic writer.
fn encode_generic(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let image = DynamicImage::ImageRgba8(image.to_rgba8());
    image
        .write_to(&mut cursor, format.codec())
        .map_err(|e| CompressorError::compression(format!("{format:?} save failed: {e}")))?;
    Ok(cursor.into_inner())
}

/// Dispatches to the encoder for `format`.
pub fn encode_as(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    match format {
        ImageFormat::JPEG => encode_jpeg(image, quality),
        ImageFormat::PNG => encode_png(image, quality),
        ImageFormat::WebP => encode_webp(image, quality),
        ImageFormat::AVIF => encode_avif(image, quality),
        ImageFormat::GIF | ImageFormat::BMP => encode_generic(image, format),
    }
}
