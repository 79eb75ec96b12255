use chrono::{DateTime, Utc};
use uuid::Uuid;

const RANDOM_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Values substituted into a naming pattern.
#[derive(Debug, Clone)]
pub struct NameParts<'a> {
    /// Original file name without extension
    pub stem: &'a str,
    /// Extension of the compressed output, without the dot
    pub ext: &'a str,
    /// Zero-based position in the export
    pub position: usize,
    pub now: DateTime<Utc>,
    pub random: String,
}

impl<'a> NameParts<'a> {
    /// Parts stamped with the current time and a fresh random suffix.
    pub fn new(stem: &'a str, ext: &'a str, position: usize) -> Self {
        Self {
            stem,
            ext,
            position,
            now: Utc::now(),
            random: random_suffix(),
        }
    }
}

/// Six lowercase base-36 characters.
pub fn random_suffix() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(RANDOM_LEN);
    for _ in 0..RANDOM_LEN {
        out.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    out
}

/// Expands every occurrence of `{name}`, `{index}`, `{date}`, `{timestamp}`,
/// `{ext}` and `{random}` in `pattern`. Unknown tokens are left as they are.
pub fn render_name(pattern: &str, parts: &NameParts<'_>) -> String {
    pattern
        .replace("{name}", parts.stem)
        .replace("{index}", &format!("{:03}", parts.position + 1))
        .replace("{date}", &parts.now.format("%Y-%m-%d").to_string())
        .replace("{timestamp}", &parts.now.timestamp_millis().to_string())
        .replace("{ext}", parts.ext)
        .replace("{random}", &parts.random)
}

/// [`render_name`] with the current time and a fresh random suffix.
pub fn apply_naming_pattern(pattern: &str, stem: &str, ext: &str, position: usize) -> String {
    render_name(pattern, &NameParts::new(stem, ext, position))
}
