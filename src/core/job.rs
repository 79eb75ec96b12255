//! Image jobs and their lifecycle state.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::{CompressedArtifact, Dimensions, SourceFile};

/// Opaque job identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Status discriminant, also the rank used when sorting by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Compressing,
    Completed,
    Error,
}

/// Lifecycle state of a job.
///
/// Completion data and error text live inside the variants, so a job can
/// never carry an artifact unless completed or an error unless failed.
#[derive(Debug, Clone)]
pub enum JobState {
    Pending,
    /// In flight; progress stays below 100 until the artifact arrives
    Compressing { progress: u8 },
    Completed(CompressedArtifact),
    Error { message: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Pending => JobStatus::Pending,
            Self::Compressing { .. } => JobStatus::Compressing,
            Self::Completed(_) => JobStatus::Completed,
            Self::Error { .. } => JobStatus::Error,
        }
    }
}

/// One user-supplied image and its compression lifecycle.
#[derive(Debug, Clone)]
pub struct ImageJob {
    id: JobId,
    source: Arc<SourceFile>,
    preview: String,
    dimensions: Option<Dimensions>,
    state: JobState,
    retry_count: u32,
    selected: bool,
}

impl ImageJob {
    pub fn new(source: SourceFile, dimensions: Option<Dimensions>) -> Self {
        let preview = source.to_data_uri();
        Self {
            id: JobId::new(),
            source: Arc::new(source),
            preview,
            dimensions,
            state: JobState::Pending,
            retry_count: 0,
            selected: false,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Shared handle for the duration of one compression call.
    pub fn shared_source(&self) -> Arc<SourceFile> {
        Arc::clone(&self.source)
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn original_size(&self) -> u64 {
        self.source.size()
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Progress percentage; 100 only once completed.
    pub fn progress(&self) -> u8 {
        match &self.state {
            JobState::Pending | JobState::Error { .. } => 0,
            JobState::Compressing { progress } => *progress,
            JobState::Completed(_) => 100,
        }
    }

    pub fn artifact(&self) -> Option<&CompressedArtifact> {
        match &self.state {
            JobState::Completed(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn compressed_size(&self) -> Option<u64> {
        self.artifact().map(|a| a.size)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Applies a partial update. Progress is only honoured while compressing
    /// and is capped at 99.
    pub(crate) fn apply(&mut self, patch: JobPatch) {
        if let Some(state) = patch.state {
            self.state = match state {
                JobState::Compressing { progress } => JobState::Compressing {
                    progress: progress.min(99),
                },
                other => other,
            };
        }

        if let Some(progress) = patch.progress {
            if let JobState::Compressing { progress: current } = &mut self.state {
                *current = progress.min(99);
            }
        }

        if let Some(retry_count) = patch.retry_count {
            self.retry_count = retry_count;
        }

        if let Some(selected) = patch.selected {
            self.selected = selected;
        }
    }
}

/// Partial-field update for [`ImageJob`].
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub state: Option<JobState>,
    pub progress: Option<u8>,
    pub retry_count: Option<u32>,
    pub selected: Option<bool>,
}

impl JobPatch {
    pub fn state(state: JobState) -> Self {
        Self { state: Some(state), ..Self::default() }
    }

    pub fn progress(progress: u8) -> Self {
        Self { progress: Some(progress), ..Self::default() }
    }

    pub fn selected(selected: bool) -> Self {
        Self { selected: Some(selected), ..Self::default() }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use super::*;

    fn job() -> ImageJob {
        ImageJob::new(SourceFile::new("a.png", "image/png", vec![0u8; 10]), None)
    }

    fn artifact() -> CompressedArtifact {
        let file = SourceFile::new("a.webp", "image/webp", vec![0u8; 4]);
        CompressedArtifact {
            size: file.size(),
            preview: file.to_data_uri(),
            file,
            dimensions: Some(Dimensions::new(2, 2)),
            elapsed: Duration::from_millis(5),
        }
    }

    fn assert_consistent(job: &ImageJob) {
        let completed = job.status() == JobStatus::Completed;
        assert_eq!(completed, job.progress() == 100);
        assert_eq!(completed, job.artifact().is_some());
        assert_eq!(job.status() == JobStatus::Error, job.error().is_some());
    }

    #[test]
    fn new_job_is_pending() {
        let job = job();
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.retry_count(), 0);
        assert!(job.preview().starts_with("data:image/png;base64,"));
        assert_consistent(&job);
    }

    #[test]
    fn progress_never_reaches_100_while_compressing() {
        let mut job = job();
        job.apply(JobPatch::state(JobState::Compressing { progress: 0 }));
        job.apply(JobPatch::progress(100));
        assert_eq!(job.progress(), 99);
        assert_consistent(&job);
    }

    #[test]
    fn progress_patch_ignored_outside_compressing() {
        let mut job = job();
        job.apply(JobPatch::progress(40));
        assert_eq!(job.progress(), 0);
        assert_eq!(job.status(), JobStatus::Pending);
    }

    #[test]
    fn state_fields_follow_status() {
        let mut job = job();
        job.apply(JobPatch::state(JobState::Completed(artifact())));
        assert_consistent(&job);
        assert_eq!(job.compressed_size(), Some(4));

        job.apply(JobPatch::state(JobState::Error { message: "boom".into() }));
        assert_consistent(&job);
        assert!(job.artifact().is_none());
        assert_eq!(job.error(), Some("boom"));
    }

    #[test]
    fn merges_only_given_fields() {
        let mut job = job();
        job.apply(JobPatch::selected(true).with_retry_count(2));
        assert!(job.is_selected());
        assert_eq!(job.retry_count(), 2);
        assert_eq!(job.status(), JobStatus::Pending);
    }
}
