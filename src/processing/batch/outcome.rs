use std::time::Duration;
use crate::core::JobId;

/// What one batch did.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Jobs now completed
    pub succeeded: Vec<JobId>,
    /// Jobs now in error, with the reason
    pub failed: Vec<(JobId, String)>,
    /// Jobs refused before starting (retry cap reached, unknown id, or in flight)
    pub refused: Vec<JobId>,
    pub elapsed: Duration,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Jobs that actually ran.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// `Successfully compressed 1 image!` / `... N images!`, or `None` when
    /// nothing succeeded.
    pub fn completion_message(&self) -> Option<String> {
        match self.success_count() {
            0 => None,
            1 => Some("Successfully compressed 1 image!".to_string()),
            n => Some(format!("Successfully compressed {n} images!")),
        }
    }
}
