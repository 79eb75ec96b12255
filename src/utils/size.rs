//! Byte-size formatting and reduction arithmetic shared by stats and logs.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human readable size, two decimals trimmed (`1.5 MB`, `512 Bytes`).
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut unit: u64 = 1;
    while exponent < UNITS.len() - 1 && bytes / unit >= 1024 {
        unit *= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / unit as f64;
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}

/// Percentage saved, rounded to the nearest integer. Grown files go negative.
pub fn reduction_percent(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let saved = original as f64 - compressed as f64;
    (saved / original as f64 * 100.0).round() as i64
}

/// Unrounded variant used for sorting.
pub fn reduction_ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

/// Compression ratio as `original:compressed`, e.g. `2.50:1`.
pub fn compression_ratio(original: u64, compressed: u64) -> String {
    if compressed == 0 {
        return "0.00:1".to_string();
    }
    format!("{:.2}:1", original as f64 / compressed as f64)
}
