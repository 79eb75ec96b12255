//! Downscaling to the configured maximum dimension.

use image::DynamicImage;
use image::imageops::FilterType;

/// Scales `image` so neither side exceeds `max_dimension`, keeping the
/// aspect ratio. Images already within bounds are returned untouched; this
/// never upscales.
pub fn fit_within(image: DynamicImage, max_dimension: Option<u32>) -> DynamicImage {
    let max = match max_dimension {
        Some(m) if m > 0 => m,
        _ => return image,
    };

    if image.width() <= max && image.height() <= max {
        return image;
    }

    image.resize(max, max, FilterType::Lanczos3)
}
