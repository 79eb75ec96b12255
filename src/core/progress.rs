use serde::{Deserialize, Serialize};
use crate::core::JobId;

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
    Error,
}

/// Batch-level progress, emitted once at start, after every job, and at the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    /// Progress type (start, progress, complete, error)
    pub progress_type: ProgressType,
    /// Number of jobs finished, successfully or not
    pub completed_tasks: usize,
    /// Total number of jobs in the batch
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// Job that just finished, if any
    #[serde(default)]
    pub task_id: Option<JobId>,
    /// Error of the job that just finished, if it failed
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchProgress {
    pub fn new(
        progress_type: ProgressType,
        completed_tasks: usize,
        total_tasks: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };

        Self {
            progress_type,
            completed_tasks,
            total_tasks,
            progress_percentage,
            status: status.to_string(),
            task_id: None,
            error: None,
        }
    }

    pub fn for_task(mut self, id: JobId) -> Self {
        self.task_id = Some(id);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
