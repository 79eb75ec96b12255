//! Ordered, id-keyed store of image jobs.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};
use crate::core::{AppConfig, AppEvent, Dimensions, ImageJob, JobId, JobPatch, JobStatus, SharedSink, SourceFile};
use crate::utils::{CompressorError, CompressorResult, ValidationError, reduction_percent};
use super::validation::validate_file;

/// A file refused at ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub name: String,
    pub reason: ValidationError,
}

impl Rejection {
    /// `photo.txt: Not an image file`
    pub fn message(&self) -> String {
        format!("{}: {}", self.name, self.reason)
    }
}

/// Result of one ingest call.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Ids of the new jobs, in input order
    pub added: Vec<JobId>,
    pub rejected: Vec<Rejection>,
}

/// Aggregate numbers over the whole registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    pub completed: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    /// Overall saving in percent, 0 until something is compressed
    pub reduction_percent: i64,
}

/// Exclusive owner of all [`ImageJob`]s.
///
/// Jobs keep insertion order and are addressed by id. Every mutation is
/// published to the attached sink before the call returns.
#[derive(Default)]
pub struct JobRegistry {
    jobs: IndexMap<JobId, ImageJob>,
    sink: Option<SharedSink>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: SharedSink) -> Self {
        Self {
            jobs: IndexMap::new(),
            sink: Some(sink),
        }
    }

    fn publish(&self, event: AppEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }

    /// Validates and appends `files`. Rejected files are reported one by one
    /// and never enter the registry.
    pub fn add<P>(&mut self, files: Vec<SourceFile>, config: &AppConfig, probe: P) -> IngestReport
    where
        P: Fn(&[u8]) -> Option<Dimensions>,
    {
        let mut report = IngestReport::default();

        for file in files {
            if let Err(reason) = validate_file(&file, config) {
                warn!("Rejected {}: {}", file.name(), reason);
                report.rejected.push(Rejection {
                    name: file.name().to_string(),
                    reason,
                });
                continue;
            }

            let dimensions = probe(file.data());
            let job = ImageJob::new(file, dimensions);
            let id = job.id();
            debug!("Registered {} as {}", job.name(), id);

            self.jobs.insert(id, job);
            self.publish(AppEvent::JobAdded { id });
            report.added.push(id);
        }

        report
    }

    /// Merges `patch` into the job with `id`.
    pub fn update(&mut self, id: JobId, patch: JobPatch) -> CompressorResult<&ImageJob> {
        let job = self.jobs.get_mut(&id).ok_or(CompressorError::NotFound(id))?;
        job.apply(patch);
        self.publish(AppEvent::JobUpdated { id });
        // Re-borrow immutably after publishing
        self.jobs.get(&id).ok_or(CompressorError::NotFound(id))
    }

    pub fn remove(&mut self, id: JobId) -> Option<ImageJob> {
        let removed = self.jobs.shift_remove(&id);
        if removed.is_some() {
            self.publish(AppEvent::JobRemoved { id });
        }
        removed
    }

    /// Removes every job matching `pred`, returning how many went.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&ImageJob) -> bool,
    {
        let doomed: Vec<JobId> = self.jobs.values().filter(|j| pred(j)).map(|j| j.id()).collect();
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
        self.publish(AppEvent::Cleared);
    }

    pub fn get(&self, id: JobId) -> Option<&ImageJob> {
        self.jobs.get(&id)
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Jobs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ImageJob> {
        self.jobs.values()
    }

    pub fn ids(&self) -> Vec<JobId> {
        self.jobs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let original_bytes = self.jobs.values().map(|j| j.original_size()).sum();
        let compressed_bytes: u64 = self.jobs.values().filter_map(|j| j.compressed_size()).sum();
        let completed = self
            .jobs
            .values()
            .filter(|j| j.status() == JobStatus::Completed)
            .count();

        RegistryStats {
            total: self.jobs.len(),
            completed,
            original_bytes,
            compressed_bytes,
            reduction_percent: if compressed_bytes > 0 {
                reduction_percent(original_bytes, compressed_bytes)
            } else {
                0
            },
        }
    }
}
