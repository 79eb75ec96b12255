use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::CompressorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
    AVIF,
    GIF,
    BMP,
}

impl ImageFormat {
    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::JPEG => &["jpg", "jpeg"],
            Self::PNG => &["png"],
            Self::WebP => &["webp"],
            Self::AVIF => &["avif"],
            Self::GIF => &["gif"],
            Self::BMP => &["bmp"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }

    /// Get the primary extension for this format
    pub fn primary_extension(&self) -> &str {
        self.extensions()[0]
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::WebP => "image/webp",
            Self::AVIF => "image/avif",
            Self::GIF => "image/gif",
            Self::BMP => "image/bmp",
        }
    }

    /// Maps a MIME type (`image/jpeg`, `image/jpg`, ...) to a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let subtype = mime.strip_prefix("image/")?;
        Self::from_str(subtype).ok()
    }

    /// Maps a file name's extension to a format.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = std::path::Path::new(name).extension()?.to_str()?;
        Self::from_str(ext).ok()
    }

    /// The codec identifier understood by the `image` crate.
    pub fn codec(&self) -> image::ImageFormat {
        match self {
            Self::JPEG => image::ImageFormat::Jpeg,
            Self::PNG => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
            Self::AVIF => image::ImageFormat::Avif,
            Self::GIF => image::ImageFormat::Gif,
            Self::BMP => image::ImageFormat::Bmp,
        }
    }

    pub fn from_codec(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::JPEG),
            image::ImageFormat::Png => Some(Self::PNG),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Avif => Some(Self::AVIF),
            image::ImageFormat::Gif => Some(Self::GIF),
            image::ImageFormat::Bmp => Some(Self::BMP),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = CompressorError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "webp" => Ok(Self::WebP),
            "avif" => Ok(Self::AVIF),
            "gif" => Ok(Self::GIF),
            "bmp" => Ok(Self::BMP),
            _ => Err(CompressorError::format(format!(
                "Unsupported image format: {}", ext
            ))),
        }
    }
}

/// Guess a MIME type from a file name, falling back to an opaque binary type.
pub fn mime_from_file_name(name: &str) -> String {
    ImageFormat::from_file_name(name)
        .map(|f| f.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}
