use std::collections::HashSet;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use image_compressor_lib::core::{Dimensions, NotificationLevel};
use image_compressor_lib::processing::{CompressedImage, ProgressSender};
use image_compressor_lib::{
    AppConfig, AppEvent, AppState, ChannelSink, CompressionSettings, Compressor, CompressorError,
    CompressorResult, ImageFormat, JobStatus, MemorySink, MemoryStorage, PresetMode, SortKey,
    SortOrder, SourceFile, ViewPreferences,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Keeps the input format, shrinks the payload to a quarter and fails for
/// any name in `failing`.
#[derive(Default)]
struct ScriptedCompressor {
    failing: Mutex<HashSet<String>>,
    qualities: Mutex<Vec<u8>>,
}

impl ScriptedCompressor {
    fn fail(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    fn heal(&self, name: &str) {
        self.failing.lock().unwrap().remove(name);
    }
}

#[async_trait]
impl Compressor for ScriptedCompressor {
    async fn compress(
        &self,
        source: Arc<SourceFile>,
        settings: &CompressionSettings,
        progress: ProgressSender,
    ) -> CompressorResult<CompressedImage> {
        self.qualities.lock().unwrap().push(settings.quality);
        progress.report(50.0);
        tokio::task::yield_now().await;

        if self.failing.lock().unwrap().contains(source.name()) {
            return Err(CompressorError::compression("scripted failure"));
        }
        Ok(CompressedImage {
            data: source.data()[..source.data().len() / 4].to_vec(),
            format: ImageFormat::from_file_name(source.name()).unwrap_or(ImageFormat::PNG),
            dimensions: Some(Dimensions::new(4, 4)),
        })
    }

    fn dimensions(&self, _data: &[u8]) -> Option<Dimensions> {
        Some(Dimensions::new(8, 8))
    }
}

struct Harness {
    state: AppState,
    compressor: Arc<ScriptedCompressor>,
    downloads: Arc<MemorySink>,
    events: UnboundedReceiver<AppEvent>,
}

impl Harness {
    fn new() -> Self {
        let compressor = Arc::new(ScriptedCompressor::default());
        let downloads = Arc::new(MemorySink::new());
        let (sink, events) = ChannelSink::new();
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryStorage::new()),
            compressor.clone(),
            downloads.clone(),
            Arc::new(sink),
        );
        Self { state, compressor, downloads, events }
    }

    /// Notification messages emitted since the last call.
    fn notifications(&mut self) -> Vec<(NotificationLevel, String)> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let AppEvent::Notify(n) = event {
                out.push((n.level, n.message));
            }
        }
        out
    }

    fn messages(&mut self) -> Vec<String> {
        self.notifications().into_iter().map(|(_, m)| m).collect()
    }
}

fn png(name: &str, size: usize) -> SourceFile {
    SourceFile::new(name, "image/png", vec![7u8; size])
}

#[tokio::test]
async fn add_files_skips_invalid_and_compresses_the_rest() {
    let mut h = Harness::new();

    let (report, outcome) = h
        .state
        .add_files(vec![
            png("a.png", 400),
            SourceFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            png("b.png", 800),
        ])
        .await;

    assert_eq!(report.added.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(h.state.registry().len(), 2);
    assert_eq!(outcome.success_count(), 2);

    for job in h.state.registry().iter() {
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.progress(), 100);
        assert!(job.artifact().is_some());
        assert!(job.error().is_none());
        assert_eq!(job.dimensions(), Some(Dimensions::new(8, 8)));
    }

    assert_eq!(
        h.messages(),
        [
            "notes.txt: Not an image file",
            "Added 2 images",
            "Successfully compressed 2 images!",
        ]
    );
}

#[tokio::test]
async fn oversized_files_are_rejected() {
    let mut h = Harness::new();
    let config = AppConfig { max_file_size: 100, ..AppConfig::default() };
    let (sink, _events) = ChannelSink::new();
    h.state = AppState::new(
        config,
        Arc::new(MemoryStorage::new()),
        h.compressor.clone(),
        h.downloads.clone(),
        Arc::new(sink),
    );

    let report = h.state.ingest(vec![png("small.png", 100), png("big.png", 101)]);
    assert_eq!(report.added.len(), 1);
    assert_eq!(report.rejected[0].name, "big.png");
    assert_eq!(h.state.registry().iter().next().unwrap().status(), JobStatus::Pending);
}

#[tokio::test]
async fn failed_job_does_not_stop_the_batch() {
    let mut h = Harness::new();
    h.compressor.fail("b.png");

    let (report, outcome) = h
        .state
        .add_files(vec![png("a.png", 40), png("b.png", 40), png("c.png", 40)])
        .await;

    assert_eq!(outcome.success_count(), 2);
    assert_eq!(outcome.failure_count(), 1);

    let failed = h.state.job(report.added[1]).unwrap();
    assert_eq!(failed.status(), JobStatus::Error);
    assert_eq!(failed.error(), Some("scripted failure"));
    assert!(failed.artifact().is_none());
    assert_eq!(h.state.job(report.added[2]).unwrap().status(), JobStatus::Completed);

    let notes = h.notifications();
    assert!(notes.contains(&(NotificationLevel::Error, "Failed to compress b.png".to_string())));
    assert!(notes.contains(&(NotificationLevel::Success, "Successfully compressed 2 images!".to_string())));
}

#[tokio::test]
async fn retry_cap_refuses_after_three_failures() {
    let mut h = Harness::new();
    h.compressor.fail("a.png");
    let (report, _) = h.state.add_files(vec![png("a.png", 40)]).await;
    let id = report.added[0];
    assert_eq!(h.state.job(id).unwrap().retry_count(), 1);
    h.notifications();

    for attempt in 2..=3 {
        h.state.retry(id).await.unwrap();
        assert_eq!(h.state.job(id).unwrap().retry_count(), attempt);
    }

    h.compressor.heal("a.png");
    h.notifications();
    let refused = h.state.retry(id).await;

    assert!(matches!(refused, Err(CompressorError::RetryLimit { attempts: 3, .. })));
    let job = h.state.job(id).unwrap();
    assert_eq!(job.retry_count(), 3);
    assert_eq!(job.status(), JobStatus::Error);
    assert_eq!(h.compressor.qualities.lock().unwrap().len(), 3);
    assert_eq!(
        h.notifications(),
        [(NotificationLevel::Error, "Maximum retry attempts reached".to_string())]
    );
}

#[tokio::test]
async fn retry_after_success_counts_as_an_attempt() {
    let mut h = Harness::new();
    let (report, _) = h.state.add_files(vec![png("a.png", 40)]).await;
    let id = report.added[0];
    h.notifications();

    let outcome = h.state.retry(id).await.unwrap();
    assert_eq!(outcome.success_count(), 1);
    assert_eq!(h.state.job(id).unwrap().retry_count(), 1);
    assert_eq!(
        h.messages(),
        ["Retrying compression...", "Successfully compressed 1 image!"]
    );
}

#[tokio::test]
async fn batch_uses_settings_captured_at_start() {
    let mut h = Harness::new();
    h.state.settings_mut().set_quality(42).unwrap();
    h.state.add_files(vec![png("a.png", 40), png("b.png", 40)]).await;

    h.state.settings_mut().set_quality(90).unwrap();
    assert_eq!(*h.compressor.qualities.lock().unwrap(), vec![42, 42]);
}

#[tokio::test]
async fn recompress_all_skips_completed_jobs() {
    let mut h = Harness::new();
    h.compressor.fail("b.png");
    h.state.add_files(vec![png("a.png", 40), png("b.png", 40)]).await;
    h.compressor.heal("b.png");
    h.compressor.qualities.lock().unwrap().clear();

    let outcome = h.state.recompress_all().await;
    assert_eq!(outcome.success_count(), 1);
    assert_eq!(h.compressor.qualities.lock().unwrap().len(), 1);
    assert_eq!(h.state.stats().completed, 2);
}

#[tokio::test]
async fn archive_preset_then_quality_edit_becomes_custom() {
    let mut h = Harness::new();
    let settings = h.state.settings_mut();

    settings.select_preset(PresetMode::Archive);
    settings.set_quality(70).unwrap();

    assert_eq!(settings.preset(), PresetMode::Custom);
    let snapshot = settings.snapshot();
    assert_eq!(snapshot.quality, 70);
    assert_eq!(snapshot.max_dimension, Some(2048));
    assert_eq!(snapshot.output_format, Some(ImageFormat::WebP));
}

#[tokio::test]
async fn size_sort_descending_reverses_ascending() {
    let mut h = Harness::new();
    h.state.ingest(vec![
        png("a.png", 300),
        png("b.png", 100),
        png("c.png", 300),
        png("d.png", 200),
    ]);

    let names = |state: &AppState| -> Vec<String> {
        state.visible_jobs().iter().map(|j| j.name().to_string()).collect()
    };

    h.state.set_view(ViewPreferences { sort_by: SortKey::Size, sort_order: SortOrder::Asc, ..Default::default() });
    let mut ascending = names(&h.state);
    h.state.set_view(ViewPreferences { sort_by: SortKey::Size, sort_order: SortOrder::Desc, ..Default::default() });
    let descending = names(&h.state);

    assert_eq!(ascending, ["b.png", "d.png", "a.png", "c.png"]);
    ascending.reverse();
    assert_eq!(ascending, descending);
}

#[tokio::test]
async fn single_download_uses_the_naming_pattern() {
    let mut h = Harness::new();
    h.state.add_files(vec![png("photo.png", 40)]).await;
    h.notifications();

    h.state.download_all().await.unwrap();

    let downloads = h.downloads.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].file_name, "photo-compressed.png");
    assert_eq!(downloads[0].size(), 10);
    assert_eq!(h.messages(), ["Image downloaded"]);
}

#[tokio::test]
async fn several_downloads_are_zipped_with_indexed_names() {
    let mut h = Harness::new();
    h.state.settings_mut().set_naming_pattern("{index}_{name}.{ext}").unwrap();
    h.state.add_files(vec![png("x.png", 40), png("y.png", 40), png("z.png", 40)]).await;
    h.notifications();

    h.state.download_all().await.unwrap();

    let downloads = h.downloads.downloads();
    assert_eq!(downloads.len(), 1);
    assert!(downloads[0].file_name.starts_with("compressed-images-"));

    let archive = zip::ZipArchive::new(Cursor::new(downloads[0].bytes.to_vec())).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    let mut names = names.into_iter().map(str::to_string).collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, ["001_x.png", "002_y.png", "003_z.png"]);
    assert_eq!(h.messages(), ["Creating ZIP file...", "ZIP file downloaded"]);
}

#[tokio::test]
async fn selection_driven_actions() {
    let mut h = Harness::new();
    let (report, _) = h.state.add_files(vec![png("a.png", 40), png("b.png", 40), png("c.png", 40)]).await;
    h.notifications();

    assert!(matches!(h.state.download_selected().await, Err(CompressorError::NothingToExport)));
    assert!(matches!(h.state.recompress_selected().await, Err(CompressorError::NothingSelected)));
    assert!(matches!(h.state.delete_selected(), Err(CompressorError::NothingSelected)));
    assert_eq!(
        h.messages(),
        ["No compressed images selected", "No images selected", "No images selected"]
    );

    assert!(h.state.toggle_select(report.added[0]).unwrap());
    assert!(h.state.toggle_select(report.added[2]).unwrap());
    h.state.download_selected().await.unwrap();
    assert!(h.downloads.downloads()[0].file_name.starts_with("selected-images-"));
    h.notifications();

    assert_eq!(h.state.delete_selected().unwrap(), 2);
    assert_eq!(h.state.registry().len(), 1);
    assert_eq!(h.messages(), ["Deleted 2 images"]);

    h.state.select_all();
    assert_eq!(h.state.selected_ids(), vec![report.added[1]]);
    h.state.deselect_all();
    assert!(h.state.selected_ids().is_empty());
}

#[tokio::test]
async fn delete_and_clear() {
    let mut h = Harness::new();
    let report = h.state.ingest(vec![png("a.png", 40), png("b.png", 40)]);
    h.notifications();

    h.state.delete(report.added[0]).unwrap();
    assert!(matches!(h.state.delete(report.added[0]), Err(CompressorError::NotFound(_))));
    h.state.clear_all();

    assert!(h.state.registry().is_empty());
    assert_eq!(h.messages(), ["Image deleted", "All images cleared"]);
}

#[tokio::test]
async fn registry_changes_are_published() {
    let mut h = Harness::new();
    let report = h.state.ingest(vec![png("a.png", 40)]);
    let id = report.added[0];

    let mut added = false;
    while let Ok(event) = h.events.try_recv() {
        if event == (AppEvent::JobAdded { id }) {
            added = true;
        }
    }
    assert!(added);

    h.state.delete(id).unwrap();
    assert_eq!(h.events.try_recv().unwrap(), AppEvent::JobRemoved { id });
}
