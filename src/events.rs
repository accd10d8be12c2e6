use crate::job::{Job, JobState};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short user-facing message, shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    Notice(Notice),
    /// Snapshot after any change to the tracked job
    JobChanged(Job),
    /// One status response was received and classified
    StatusPolled { job_id: String, state: JobState },
}

pub type EventSender = mpsc::UnboundedSender<ControllerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Unbounded event channel.
///
/// The poller publishes a `StatusPolled` event on every tick, so a receiver
/// that is kept must be read continuously. Drop it when events are not wanted;
/// sends to a closed channel are discarded.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Send without caring whether anyone is still listening.
pub(crate) fn emit(events: &EventSender, event: ControllerEvent) {
    let _ = events.send(event);
}
