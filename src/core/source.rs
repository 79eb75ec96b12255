//! Input files as handed over by the host.
//!
//! Every ingest path (file picker, drag and drop, clipboard, camera, remote
//! URL) produces a [`SourceFile`] and funnels into the same validation entry
//! point on the registry.

use std::path::Path;
use std::sync::Arc;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use crate::utils::{CompressorResult, mime_from_file_name};

/// An in-memory file: name, MIME type and shared immutable bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    mime: String,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.data.len())
            .finish()
    }
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> CompressorResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_from_file_name(&name);
        Ok(Self::new(name, mime, data))
    }

    /// An image pasted from the clipboard.
    pub fn from_clipboard(mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let name = format!("clipboard-{}.png", chrono::Utc::now().timestamp_millis());
        Self::new(name, mime, data)
    }

    /// A still frame captured from a camera, always JPEG encoded.
    pub fn from_camera(data: impl Into<Arc<[u8]>>) -> Self {
        let name = format!("camera-{}.jpg", chrono::Utc::now().timestamp_millis());
        Self::new(name, "image/jpeg", data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Cheap handle on the bytes for moving into blocking tasks.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }

    /// Final extension without the dot, empty when there is none.
    pub fn extension(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[idx + 1..],
            _ => "",
        }
    }

    /// Base64 `data:` URI of the contents.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_stem_and_extension() {
        let file = SourceFile::new("holiday.photo.png", "image/png", vec![1u8, 2, 3]);
        assert_eq!(file.stem(), "holiday.photo");
        assert_eq!(file.extension(), "png");
        assert_eq!(file.size(), 3);

        let bare = SourceFile::new(".hidden", "image/png", vec![]);
        assert_eq!(bare.stem(), ".hidden");
        assert_eq!(bare.extension(), "");
    }

    #[test]
    fn data_uri_has_mime_and_payload() {
        let file = SourceFile::new("a.gif", "image/gif", b"GIF".to_vec());
        assert_eq!(file.to_data_uri(), "data:image/gif;base64,R0lG");
    }

    #[test]
    fn capture_sources_get_generated_names() {
        let pasted = SourceFile::from_clipboard("image/png", vec![0u8]);
        assert!(pasted.name().starts_with("clipboard-"));
        assert!(pasted.name().ends_with(".png"));

        let frame = SourceFile::from_camera(vec![0u8]);
        assert_eq!(frame.mime(), "image/jpeg");
        assert!(frame.name().starts_with("camera-"));
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        std::fs::write(&path, b"jpeg-bytes").unwrap();

        let file = SourceFile::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "shot.jpg");
        assert_eq!(file.mime(), "image/jpeg");
        assert_eq!(file.data(), b"jpeg-bytes");
    }
}
