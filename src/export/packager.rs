//! Turns completed jobs into a single deliverable file.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use crate::core::ImageJob;
use crate::utils::{CompressorError, CompressorResult, format_bytes};
use super::naming::apply_naming_pattern;

pub const ZIP_MIME: &str = "application/zip";

/// A named blob ready to hand to a [`DownloadSink`](super::DownloadSink).
#[derive(Clone)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl Download {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One archive entry, detached from the registry so it can move to a
/// blocking thread.
struct Entry {
    name: String,
    bytes: Arc<[u8]>,
}

/// Packs compressed outputs: one job becomes one file, two or more become a
/// ZIP archive.
#[derive(Debug, Clone, Copy)]
pub struct ExportPackager {
    method: CompressionMethod,
}

impl Default for ExportPackager {
    fn default() -> Self {
        // Outputs are already compressed images
        Self { method: CompressionMethod::Stored }
    }
}

impl ExportPackager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(method: CompressionMethod) -> Self {
        Self { method }
    }

    /// Packages the completed jobs among `jobs`, in order. Entry names come
    /// from `pattern` with each job's position; the archive is named
    /// `<archive_prefix>-<ms>.zip`.
    pub async fn package(
        &self,
        jobs: &[&ImageJob],
        pattern: &str,
        archive_prefix: &str,
    ) -> CompressorResult<Download> {
        let mut entries: Vec<(Entry, String)> = jobs
            .iter()
            .filter_map(|job| job.artifact().map(|artifact| (job, artifact)))
            .enumerate()
            .map(|(position, (job, artifact))| {
                let name = apply_naming_pattern(
                    pattern,
                    job.source().stem(),
                    artifact.file.extension(),
                    position,
                );
                let entry = Entry { name, bytes: artifact.file.shared_data() };
                (entry, artifact.file.mime().to_string())
            })
            .collect();

        match entries.len() {
            0 => Err(CompressorError::NothingToExport),
            1 => {
                let (entry, mime) = entries.remove(0);
                debug!("Exporting single file {}", entry.name);
                Ok(Download { file_name: entry.name, mime, bytes: entry.bytes })
            }
            count => {
                let entries: Vec<Entry> = entries.into_iter().map(|(entry, _)| entry).collect();
                let method = self.method;
                let bytes = tokio::task::spawn_blocking(move || build_archive(&entries, method))
                    .await
                    .map_err(|e| CompressorError::export(format!("Archive task failed: {e}")))??;

                let file_name = format!("{}-{}.zip", archive_prefix, Utc::now().timestamp_millis());
                info!("Created {} with {} entries ({})", file_name, count, format_bytes(bytes.len() as u64));
                Ok(Download { file_name, mime: ZIP_MIME.to_string(), bytes: bytes.into() })
            }
        }
    }
}

fn build_archive(entries: &[Entry], method: CompressionMethod) -> CompressorResult<Vec<u8>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(CompressorError::export(format!("Duplicate file name in archive: {}", entry.name)));
        }
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&entry.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
