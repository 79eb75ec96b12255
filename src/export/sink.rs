use std::path::{Path, PathBuf};
use std::sync::Mutex;
use async_trait::async_trait;
use tracing::debug;
use crate::utils::{CompressorError, CompressorResult};
use super::packager::Download;

/// Destination for finished exports.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, download: Download) -> CompressorResult<()>;
}

/// Writes each download into a directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, download: Download) -> CompressorResult<()> {
        // Entry names may not escape the target directory
        let file_name = Path::new(&download.file_name)
            .file_name()
            .ok_or_else(|| CompressorError::export(format!("Invalid file name: {}", download.file_name)))?;
        let path = self.dir.join(file_name);
        let mut partial = std::ffi::OsString::from(".");
        partial.push(file_name);
        partial.push(".part");
        let partial = self.dir.join(partial);

        tokio::fs::create_dir_all(&self.dir).await?;
        // Readers see either the old file or the complete new one
        let written = match tokio::fs::write(&partial, &download.bytes).await {
            Ok(()) => tokio::fs::rename(&partial, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        debug!("Wrote {} ({} bytes)", path.display(), download.size());
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn deliver(&self, download: Download) -> CompressorResult<()> {
        self.downloads
            .lock()
            .map_err(|_| CompressorError::export("Download sink poisoned"))?
            .push(download);
        Ok(())
    }
}
