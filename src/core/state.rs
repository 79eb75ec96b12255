//! The single owner of all application state.
//!
//! [`AppState`] holds the settings store, the job registry and the
//! processing and export pipeline, and exposes the user-level actions on
//! top of them. Every action reports its outcome to the attached
//! [`EventSink`](crate::core::EventSink) as a notification.

use std::sync::Arc;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use crate::core::{AppConfig, ImageJob, JobId, JobStatus, Notification, SharedSink, SourceFile};
use crate::export::{DownloadSink, ExportPackager};
use crate::processing::{BatchCoordinator, BatchOutcome, CompressionDriver, Compressor, NativeCompressor};
use crate::registry::{IngestReport, JobRegistry, RegistryStats};
use crate::settings::{PreferenceStorage, SettingsStore};
use crate::utils::{CompressorError, CompressorResult, ValidationError};
use crate::view::{self, Selection, ViewPreferences};

/// Application state: owned by one task, mutated through `&mut self`.
pub struct AppState {
    config: AppConfig,
    settings: SettingsStore,
    registry: JobRegistry,
    coordinator: BatchCoordinator,
    packager: ExportPackager,
    downloads: Arc<dyn DownloadSink>,
    events: SharedSink,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn PreferenceStorage>,
        compressor: Arc<dyn Compressor>,
        downloads: Arc<dyn DownloadSink>,
        events: SharedSink,
    ) -> Self {
        let settings = SettingsStore::load_with_key(storage, config.preferences_key.clone());
        let registry = JobRegistry::with_sink(Arc::clone(&events));
        let coordinator = BatchCoordinator::new(
            CompressionDriver::new(compressor),
            Arc::clone(&events),
            config.max_retry_attempts,
        );

        Self {
            config,
            settings,
            registry,
            coordinator,
            packager: ExportPackager::new(),
            downloads,
            events,
            http: reqwest::Client::new(),
        }
    }

    /// State backed by the in-process [`NativeCompressor`].
    pub fn native(
        config: AppConfig,
        storage: Arc<dyn PreferenceStorage>,
        downloads: Arc<dyn DownloadSink>,
        events: SharedSink,
    ) -> Self {
        Self::new(config, storage, Arc::new(NativeCompressor::new()), downloads, events)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn job(&self, id: JobId) -> Option<&ImageJob> {
        self.registry.get(id)
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    fn notify(&self, notification: Notification) {
        self.events.notify(notification);
    }

    // ── Input ──────────────────────────────────────────────────────────────

    /// Registers `files` without compressing them. Each rejected file is
    /// reported as `<name>: <reason>`.
    pub fn ingest(&mut self, files: Vec<SourceFile>) -> IngestReport {
        let driver = self.coordinator.driver();
        let report = self.registry.add(files, &self.config, |data| driver.dimensions(data));

        for rejection in &report.rejected {
            self.notify(Notification::error(rejection.message()));
        }
        if !report.added.is_empty() {
            let count = report.added.len();
            let plural = if count > 1 { "s" } else { "" };
            self.notify(Notification::success(format!("Added {count} image{plural}")));
        }
        report
    }

    /// Registers `files` and compresses the accepted ones right away.
    pub async fn add_files(&mut self, files: Vec<SourceFile>) -> (IngestReport, BatchOutcome) {
        let report = self.ingest(files);
        let outcome = self.compress(&report.added).await;
        (report, outcome)
    }

    /// Downloads an image over HTTP and adds it.
    pub async fn import_from_url(&mut self, url: &str) -> CompressorResult<(IngestReport, BatchOutcome)> {
        match self.fetch(url).await {
            Ok(file) => Ok(self.add_files(vec![file]).await),
            Err(e) => {
                warn!("Import from {} failed: {}", url, e);
                self.notify(Notification::error(format!("Failed to import image: {e}")));
                Err(e)
            }
        }
    }

    /// GETs `url`, refusing non-images and bodies over `max_file_size`
    /// before they are buffered.
    async fn fetch(&self, url: &str) -> CompressorResult<SourceFile> {
        let max = self.config.max_file_size;
        let mut response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CompressorError::network(format!("{url} returned {status}")));
        }

        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if !mime.starts_with("image/") {
            return Err(ValidationError::NotAnImage { mime }.into());
        }

        if let Some(size) = response.content_length().filter(|&size| size > max) {
            return Err(ValidationError::TooLarge { size, max }.into());
        }

        let name = file_name_from_url(response.url());
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let size = (body.len() + chunk.len()) as u64;
            if size > max {
                return Err(ValidationError::TooLarge { size, max }.into());
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} ({} bytes) from {}", name, body.len(), url);
        Ok(SourceFile::new(name, mime, body))
    }

    // ── Compression ────────────────────────────────────────────────────────

    /// Runs one batch over `ids` with the settings as they are right now.
    pub async fn compress(&mut self, ids: &[JobId]) -> BatchOutcome {
        let snapshot = self.settings.snapshot();
        self.coordinator.run(&mut self.registry, ids, snapshot).await
    }

    /// Re-submits one job. Refused without any change once the retry cap is
    /// reached.
    pub async fn retry(&mut self, id: JobId) -> CompressorResult<BatchOutcome> {
        let job = self.registry.get(id).ok_or(CompressorError::NotFound(id))?;
        if let Err(e) = self.coordinator.admit(job) {
            self.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        self.notify(Notification::info("Retrying compression..."));
        Ok(self.compress(&[id]).await)
    }

    /// Re-submits every job that has not completed.
    pub async fn recompress_all(&mut self) -> BatchOutcome {
        let ids: Vec<JobId> = self
            .registry
            .iter()
            .filter(|j| j.status() != JobStatus::Completed)
            .map(|j| j.id())
            .collect();
        self.compress(&ids).await
    }

    pub async fn recompress_selected(&mut self) -> CompressorResult<BatchOutcome> {
        let selection = self.current_selection()?;
        Ok(self.compress(selection.ids()).await)
    }

    // ── Export ─────────────────────────────────────────────────────────────

    /// Delivers one completed job under the configured naming pattern.
    pub async fn download(&self, id: JobId) -> CompressorResult<()> {
        let job = self.registry.get(id).ok_or(CompressorError::NotFound(id))?;
        if job.artifact().is_none() {
            return Err(CompressorError::NothingToExport);
        }
        self.export(vec![job], &self.config.all_archive_prefix, "ZIP file downloaded").await
    }

    /// Delivers every completed job, as an archive when there is more than one.
    pub async fn download_all(&self) -> CompressorResult<()> {
        let jobs: Vec<&ImageJob> = self.registry.iter().filter(|j| j.artifact().is_some()).collect();
        if jobs.is_empty() {
            return Err(CompressorError::NothingToExport);
        }
        self.export(jobs, &self.config.all_archive_prefix, "ZIP file downloaded").await
    }

    /// Delivers the selected completed jobs.
    pub async fn download_selected(&self) -> CompressorResult<()> {
        let jobs: Vec<&ImageJob> = self
            .registry
            .iter()
            .filter(|j| j.is_selected() && j.artifact().is_some())
            .collect();
        if jobs.is_empty() {
            self.notify(Notification::error("No compressed images selected"));
            return Err(CompressorError::NothingToExport);
        }
        self.export(jobs, &self.config.selected_archive_prefix, "Selected images downloaded").await
    }

    async fn export(&self, jobs: Vec<&ImageJob>, archive_prefix: &str, archive_done: &str) -> CompressorResult<()> {
        let archive = jobs.len() > 1;
        if archive {
            self.notify(Notification::info("Creating ZIP file..."));
        }

        let result = async {
            let download = self
                .packager
                .package(&jobs, self.settings.naming_pattern(), archive_prefix)
                .await?;
            let file_name = download.file_name.clone();
            self.downloads.deliver(download).await?;
            Ok::<_, CompressorError>(file_name)
        }
        .await;

        match result {
            Ok(file_name) => {
                info!("Delivered {}", file_name);
                let message = if archive { archive_done } else { "Image downloaded" };
                self.notify(Notification::success(message));
                Ok(())
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.notify(Notification::error(e.to_string()));
                Err(e)
            }
        }
    }

    // ── Removal ────────────────────────────────────────────────────────────

    pub fn delete(&mut self, id: JobId) -> CompressorResult<()> {
        self.registry.remove(id).ok_or(CompressorError::NotFound(id))?;
        self.notify(Notification::success("Image deleted"));
        Ok(())
    }

    pub fn delete_selected(&mut self) -> CompressorResult<usize> {
        self.current_selection()?;
        let count = self.registry.remove_where(|j| j.is_selected());
        let plural = if count > 1 { "s" } else { "" };
        self.notify(Notification::success(format!("Deleted {count} image{plural}")));
        Ok(count)
    }

    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.notify(Notification::success("All images cleared"));
    }

    // ── Selection & view ───────────────────────────────────────────────────

    fn current_selection(&self) -> CompressorResult<Selection> {
        Selection::current(&self.registry).inspect_err(|e| self.notify(Notification::error(e.to_string())))
    }

    /// Flips the selection flag of one job and returns the new value.
    pub fn toggle_select(&mut self, id: JobId) -> CompressorResult<bool> {
        view::toggle(&mut self.registry, id)
    }

    pub fn select_all(&mut self) {
        view::select_all(&mut self.registry);
    }

    pub fn deselect_all(&mut self) {
        view::deselect_all(&mut self.registry);
    }

    pub fn selected_ids(&self) -> Vec<JobId> {
        view::selected_ids(&self.registry)
    }

    /// Jobs as currently filtered and sorted by the view preferences.
    pub fn visible_jobs(&self) -> Vec<&ImageJob> {
        view::visible(&self.registry, &self.settings.view())
    }

    pub fn set_view(&mut self, view: ViewPreferences) {
        self.settings.set_view(view);
    }
}

fn file_name_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("image-{}.jpg", Utc::now().timestamp_millis()))
}
