//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`AppState`]: the owner of settings, jobs and the processing pipeline
//! - [`ImageJob`]: one image and its compression lifecycle
//! - [`CompressionSettings`]: parameters captured for one batch
//! - [`CompressedArtifact`]: output of a successful compression
//! - [`BatchProgress`]: progress tracking for batch operations
//! - [`AppEvent`]: everything published to the host

mod config;
mod events;
mod job;
mod progress;
mod source;
mod state;
mod types;

pub use config::{AppConfig, MAX_FILE_SIZE, MAX_RETRY_ATTEMPTS, PREFERENCES_KEY};
pub use events::{AppEvent, ChannelSink, EventSink, Notification, NotificationLevel, SharedSink, TracingSink};
pub use job::{ImageJob, JobId, JobPatch, JobState, JobStatus};
pub use progress::{BatchProgress, ProgressType};
pub use source::SourceFile;
pub use state::AppState;
pub use types::{CompressedArtifact, CompressionSettings, DEFAULT_NAMING_PATTERN, Dimensions};
