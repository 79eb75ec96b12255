//! Events published to the host: registry changes, batch progress and
//! transient user notifications.

use std::sync::Arc;
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};
use crate::core::{BatchProgress, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A transient, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    JobAdded { id: JobId },
    JobUpdated { id: JobId },
    JobRemoved { id: JobId },
    Cleared,
    Batch(BatchProgress),
    Notify(Notification),
}

/// Subscriber for [`AppEvent`]s. Emission never blocks and never fails.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);

    fn notify(&self, notification: Notification) {
        self.emit(AppEvent::Notify(notification));
    }
}

pub type SharedSink = Arc<dyn EventSink>;

/// Forwards events over an unbounded channel.
#[derive(Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<AppEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AppEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.tx.send(event);
    }
}

/// Writes notifications and batch milestones to the log; registry chatter
/// goes to debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: AppEvent) {
        match event {
            AppEvent::Notify(Notification { level: NotificationLevel::Error, message }) => {
                warn!("{message}")
            }
            AppEvent::Notify(Notification { message, .. }) => info!("{message}"),
            AppEvent::Batch(progress) => debug!(
                "Batch {:?}: {}/{} ({}%)",
                progress.progress_type,
                progress.completed_tasks,
                progress.total_tasks,
                progress.progress_percentage
            ),
            other => debug!("{other:?}"),
        }
    }
}
