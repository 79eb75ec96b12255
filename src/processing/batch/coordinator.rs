use std::time::Instant;
use tracing::{debug, info, warn};
use crate::core::{
    AppEvent, BatchProgress, CompressionSettings, ImageJob, JobId, JobPatch, JobState, JobStatus,
    Notification, ProgressType, SharedSink,
};
use crate::processing::driver::{CompressionDriver, ProgressSender};
use crate::registry::JobRegistry;
use crate::utils::{CompressorError, CompressorResult};
use super::outcome::BatchOutcome;

/// Drives the compression driver over a batch, one job at a time.
pub struct BatchCoordinator {
    driver: CompressionDriver,
    sink: SharedSink,
    max_retry_attempts: u32,
}

impl BatchCoordinator {
    pub fn new(driver: CompressionDriver, sink: SharedSink, max_retry_attempts: u32) -> Self {
        Self {
            driver,
            sink,
            max_retry_attempts,
        }
    }

    pub fn driver(&self) -> &CompressionDriver {
        &self.driver
    }

    /// Whether `job` may enter `compressing` now, and the retry count it will
    /// carry when it does. Re-submitting a completed or failed job is a
    /// retry and costs one attempt. A failed first run already counts as one,
    /// so a job that keeps failing is compressed at most `max_retry_attempts`
    /// times.
    pub fn admit(&self, job: &ImageJob) -> CompressorResult<u32> {
        match job.status() {
            JobStatus::Pending => Ok(job.retry_count()),
            JobStatus::Compressing => Err(CompressorError::compression(format!(
                "{} is already being compressed",
                job.name()
            ))),
            JobStatus::Completed | JobStatus::Error => {
                if job.retry_count() >= self.max_retry_attempts {
                    Err(CompressorError::RetryLimit {
                        id: job.id(),
                        attempts: job.retry_count(),
                    })
                } else {
                    Ok(job.retry_count() + 1)
                }
            }
        }
    }

    /// Compresses `ids` in order with the given settings snapshot.
    ///
    /// Each job is awaited before the next starts. Progress reported by the
    /// backend is applied to the registry while the job runs. A failing job
    /// is marked `error` and the batch moves on.
    pub async fn run(
        &self,
        registry: &mut JobRegistry,
        ids: &[JobId],
        settings: CompressionSettings,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if ids.is_empty() {
            return outcome;
        }

        let total = ids.len();
        let started = Instant::now();
        info!("Processing batch of {} images (quality {})", total, settings.quality);
        self.sink.emit(AppEvent::Batch(BatchProgress::new(
            ProgressType::Start,
            0,
            total,
            "processing",
        )));

        for (idx, &id) in ids.iter().enumerate() {
            let completed = idx + 1;
            match self.run_one(registry, id, &settings).await {
                Ok(Some(())) => {
                    outcome.succeeded.push(id);
                    self.emit_progress(completed, total, id, None);
                }
                Ok(None) => {
                    outcome.refused.push(id);
                }
                Err(reason) => {
                    self.emit_progress(completed, total, id, Some(&reason));
                    outcome.failed.push((id, reason));
                }
            }
        }

        outcome.elapsed = started.elapsed();

        let mut complete = BatchProgress::new(ProgressType::Complete, total, total, "complete");
        if outcome.failure_count() > 0 {
            complete.status = format!("complete with {} failed", outcome.failure_count());
            warn!(
                "Batch completed with {} failed images out of {}",
                outcome.failure_count(),
                total
            );
        } else {
            info!(
                "Batch completed: {} images in {:.2}s",
                outcome.success_count(),
                outcome.elapsed.as_secs_f64()
            );
        }
        self.sink.emit(AppEvent::Batch(complete));

        if let Some(message) = outcome.completion_message() {
            self.sink.notify(Notification::success(message));
        }

        outcome
    }

    /// `Ok(Some)` on success, `Ok(None)` when refused, `Err(reason)` when the
    /// compression failed.
    async fn run_one(
        &self,
        registry: &mut JobRegistry,
        id: JobId,
        settings: &CompressionSettings,
    ) -> Result<Option<()>, String> {
        let Some(job) = registry.get(id) else {
            debug!("Job {} vanished before compression", id);
            return Ok(None);
        };

        let retry_count = match self.admit(job) {
            Ok(count) => count,
            Err(e) => {
                if matches!(e, CompressorError::RetryLimit { .. }) {
                    self.sink.notify(Notification::error(e.to_string()));
                }
                debug!("Refused {}: {}", job.name(), e);
                return Ok(None);
            }
        };

        let source = job.shared_source();
        let name = job.name().to_string();

        // Entering compressing clears any previous artifact or error
        let start = JobPatch::state(JobState::Compressing { progress: 0 }).with_retry_count(retry_count);
        if registry.update(id, start).is_err() {
            return Ok(None);
        }

        let (progress, mut reports) = ProgressSender::channel();
        let compression = self.driver.compress(source, settings, progress);
        tokio::pin!(compression);

        let result = loop {
            tokio::select! {
                result = &mut compression => break result,
                Some(percent) = reports.recv() => {
                    let _ = registry.update(id, JobPatch::progress(percent));
                }
            }
        };

        match result {
            Ok(artifact) => {
                let _ = registry.update(id, JobPatch::state(JobState::Completed(artifact)));
                Ok(Some(()))
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Compression failed for {}: {}", name, message);
                let failed = JobPatch::state(JobState::Error { message: message.clone() })
                    .with_retry_count(retry_count.max(1));
                let _ = registry.update(id, failed);
                self.sink.notify(Notification::error(format!("Failed to compress {name}")));
                Err(message)
            }
        }
    }

    fn emit_progress(&self, completed: usize, total: usize, id: JobId, error: Option<&str>) {
        let progress_type = if error.is_some() {
            ProgressType::Error
        } else {
            ProgressType::Progress
        };
        let mut progress = BatchProgress::new(progress_type, completed, total, "processing").for_task(id);
        if let Some(error) = error {
            progress = progress.with_error(error);
        }
        self.sink.emit(AppEvent::Batch(progress));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use async_trait::async_trait;
    use super::*;
    use crate::core::{AppConfig, ChannelSink, Dimensions, SourceFile, TracingSink};
    use crate::processing::driver::{CompressedImage, Compressor};
    use crate::utils::ImageFormat;

    /// Fails for names in `failing`, otherwise halves the input.
    #[derive(Default)]
    struct Scripted {
        failing: Mutex<HashSet<String>>,
        seen_quality: Mutex<Vec<u8>>,
    }

    #[async_trait]
    impl Compressor for Scripted {
        async fn compress(
            &self,
            source: Arc<SourceFile>,
            settings: &CompressionSettings,
            progress: ProgressSender,
        ) -> CompressorResult<CompressedImage> {
            self.seen_quality.lock().unwrap().push(settings.quality);
            progress.report(30.0);
            tokio::task::yield_now().await;
            progress.report(100.0);
            tokio::task::yield_now().await;

            if self.failing.lock().unwrap().contains(source.name()) {
                return Err(CompressorError::compression("backend exploded"));
            }
            Ok(CompressedImage {
                data: vec![0u8; source.data().len() / 2],
                format: ImageFormat::PNG,
                dimensions: Some(Dimensions::new(1, 1)),
            })
        }

        fn dimensions(&self, _data: &[u8]) -> Option<Dimensions> {
            None
        }
    }

    fn setup(names: &[&str]) -> (BatchCoordinator, Arc<Scripted>, JobRegistry, Vec<JobId>) {
        let compressor = Arc::new(Scripted::default());
        let coordinator = BatchCoordinator::new(
            CompressionDriver::new(compressor.clone()),
            Arc::new(TracingSink),
            3,
        );
        let mut registry = JobRegistry::new();
        let files = names
            .iter()
            .map(|n| SourceFile::new(*n, "image/png", vec![0u8; 100]))
            .collect();
        let ids = registry.add(files, &AppConfig::default(), |_| None).added;
        (coordinator, compressor, registry, ids)
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let (coordinator, compressor, mut registry, ids) = setup(&["a.png", "b.png", "c.png"]);
        compressor.failing.lock().unwrap().insert("b.png".into());

        let outcome = coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;

        assert_eq!(outcome.succeeded, vec![ids[0], ids[2]]);
        assert_eq!(outcome.failed, vec![(ids[1], "backend exploded".to_string())]);

        let b = registry.get(ids[1]).unwrap();
        assert_eq!(b.status(), JobStatus::Error);
        assert_eq!(b.error(), Some("backend exploded"));
        assert_eq!(b.progress(), 0);

        let a = registry.get(ids[0]).unwrap();
        assert_eq!(a.status(), JobStatus::Completed);
        assert_eq!(a.progress(), 100);
        assert_eq!(a.compressed_size(), Some(50));
    }

    #[tokio::test]
    async fn uses_the_snapshot_for_every_job() {
        let (coordinator, compressor, mut registry, ids) = setup(&["a.png", "b.png"]);
        let settings = CompressionSettings { quality: 33, ..CompressionSettings::default() };

        coordinator.run(&mut registry, &ids, settings).await;
        assert_eq!(*compressor.seen_quality.lock().unwrap(), vec![33, 33]);
    }

    #[tokio::test]
    async fn retry_counts_and_cap() {
        let (coordinator, compressor, mut registry, ids) = setup(&["a.png"]);
        compressor.failing.lock().unwrap().insert("a.png".into());
        let id = ids[0];

        // A failed first run uses up the first attempt
        coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;
        assert_eq!(registry.get(id).unwrap().retry_count(), 1);

        for expected in 2..=3 {
            let outcome = coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;
            assert_eq!(outcome.failure_count(), 1);
            assert_eq!(registry.get(id).unwrap().retry_count(), expected);
        }

        let job = registry.get(id).unwrap();
        assert!(matches!(coordinator.admit(job), Err(CompressorError::RetryLimit { attempts: 3, .. })));

        let outcome = coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;
        assert_eq!(outcome.refused, vec![id]);
        let job = registry.get(id).unwrap();
        assert_eq!(job.retry_count(), 3);
        assert_eq!(job.status(), JobStatus::Error);
        assert_eq!(*compressor.seen_quality.lock().unwrap(), vec![75, 75, 75]);
    }

    #[tokio::test]
    async fn successful_first_run_is_not_a_retry() {
        let (coordinator, _, mut registry, ids) = setup(&["a.png"]);
        coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;
        assert_eq!(registry.get(ids[0]).unwrap().retry_count(), 0);

        coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;
        assert_eq!(registry.get(ids[0]).unwrap().retry_count(), 1);
    }

    #[tokio::test]
    async fn emits_progress_and_plural_summary() {
        let (sink, mut rx) = ChannelSink::new();
        let compressor = Arc::new(Scripted::default());
        let coordinator = BatchCoordinator::new(CompressionDriver::new(compressor), Arc::new(sink), 3);
        let mut registry = JobRegistry::new();
        let ids = registry
            .add(
                vec![
                    SourceFile::new("a.png", "image/png", vec![0u8; 10]),
                    SourceFile::new("b.png", "image/png", vec![0u8; 10]),
                ],
                &AppConfig::default(),
                |_| None,
            )
            .added;

        coordinator.run(&mut registry, &ids, CompressionSettings::default()).await;

        let mut batch = Vec::new();
        let mut notes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Batch(p) => batch.push((p.progress_type, p.progress_percentage)),
                AppEvent::Notify(n) => notes.push(n.message),
                _ => {}
            }
        }

        assert_eq!(
            batch,
            [
                (ProgressType::Start, 0),
                (ProgressType::Progress, 50),
                (ProgressType::Progress, 100),
                (ProgressType::Complete, 100),
            ]
        );
        assert_eq!(notes, ["Successfully compressed 2 images!"]);
    }

    #[tokio::test]
    async fn unknown_ids_are_refused() {
        let (coordinator, _, mut registry, _) = setup(&[]);
        let ghost = JobId::new();
        let outcome = coordinator.run(&mut registry, &[ghost], CompressionSettings::default()).await;
        assert_eq!(outcome.refused, vec![ghost]);
        assert_eq!(outcome.attempted(), 0);
    }
}
