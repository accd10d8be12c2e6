use crate::api::{OutputFile, StatusResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

pub mod client;
pub mod poller;

pub use client::{JobClient, SubmitError};
pub use poller::StatusPoller;

pub const STARTING_MESSAGE: &str = "Starting...";
pub const PROCESSING_MESSAGE: &str = "Processing...";
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

/// What one status response means for the tracked job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Running { message: String },
    Completed { outputs: Vec<OutputFile>, email_sent: bool },
    Failed { message: String },
}

impl StatusUpdate {
    /// `None` when the response carries no status at all; such a response
    /// leaves the job untouched.
    pub fn classify(response: StatusResponse) -> Option<Self> {
        let update = match response.status.trim() {
            "" => return None,
            "completed" => StatusUpdate::Completed {
                outputs: response.outputs.unwrap_or_default(),
                email_sent: response.email_sent.unwrap_or(false),
            },
            "error" => StatusUpdate::Failed {
                message: response
                    .message
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            },
            _ => StatusUpdate::Running {
                message: response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| PROCESSING_MESSAGE.to_string()),
            },
        };
        Some(update)
    }

    pub fn state(&self) -> JobState {
        match self {
            StatusUpdate::Running { .. } => JobState::Processing,
            StatusUpdate::Completed { .. } => JobState::Completed,
            StatusUpdate::Failed { .. } => JobState::Error,
        }
    }
}

/// The single job tracked by a controller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Job {
    pub id: Option<String>,
    pub state: JobState,
    pub message: String,
    pub outputs: Vec<OutputFile>,
    pub email_sent: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Fresh job about to be submitted: processing, no id yet.
    pub fn starting() -> Self {
        Self {
            state: JobState::Processing,
            message: STARTING_MESSAGE.to_string(),
            submitted_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn is_processing(&self) -> bool {
        self.state == JobState::Processing
    }

    /// Applies a classified status response. Returns true if anything changed.
    pub fn apply(&mut self, update: StatusUpdate) -> bool {
        match update {
            StatusUpdate::Running { message } => {
                if self.message == message {
                    return false;
                }
                self.message = message;
            }
            StatusUpdate::Completed { outputs, email_sent } => {
                self.state = JobState::Completed;
                self.outputs = outputs;
                self.email_sent = email_sent;
                self.finished_at = Some(Utc::now());
            }
            StatusUpdate::Failed { message } => {
                self.state = JobState::Error;
                self.message = message;
                self.finished_at = Some(Utc::now());
            }
        }
        true
    }

    pub fn elapsed_secs(&self) -> Option<i64> {
        let start = self.submitted_at?;
        let end = self.finished_at.unwrap_or_else(Utc::now);
        Some((end - start).num_seconds())
    }
}

/// Locks a shared job, recovering the data if a holder panicked.
pub(crate) fn lock(job: &Mutex<Job>) -> MutexGuard<'_, Job> {
    job.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(name: &str) -> OutputFile {
        OutputFile {
            filename: name.to_string(),
            url: format!("/output/{}", name),
        }
    }

    #[test]
    fn test_classify_completed() {
        let update = StatusUpdate::classify(StatusResponse::completed(
            vec![output("a.mp4"), output("b.mp4")],
            true,
        ))
        .unwrap();
        assert_eq!(update.state(), JobState::Completed);
        match update {
            StatusUpdate::Completed { outputs, email_sent } => {
                assert_eq!(outputs[0].filename, "a.mp4");
                assert_eq!(outputs[1].filename, "b.mp4");
                assert!(email_sent);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_classify_error_keeps_message_verbatim() {
        let update = StatusUpdate::classify(StatusResponse::error("decode failed"));
        assert_eq!(
            update,
            Some(StatusUpdate::Failed {
                message: "decode failed".to_string()
            })
        );
    }

    #[test]
    fn test_classify_unknown_status_is_running() {
        let update = StatusUpdate::classify(StatusResponse {
            status: "not_found".to_string(),
            ..StatusResponse::default()
        });
        assert_eq!(
            update,
            Some(StatusUpdate::Running {
                message: PROCESSING_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn test_classify_blank_status_is_no_update() {
        let missing = StatusResponse {
            message: Some("Queued".to_string()),
            ..StatusResponse::default()
        };
        assert_eq!(StatusUpdate::classify(missing), None);

        let blank = StatusResponse {
            status: "  ".to_string(),
            ..StatusResponse::default()
        };
        assert_eq!(StatusUpdate::classify(blank), None);
    }

    #[test]
    fn test_running_update_only_changes_on_new_message() {
        let mut job = Job::starting();
        assert!(job.apply(StatusUpdate::Running {
            message: "Cutting...".to_string()
        }));
        assert!(!job.apply(StatusUpdate::Running {
            message: "Cutting...".to_string()
        }));
        assert_eq!(job.state, JobState::Processing);
        assert_eq!(job.message, "Cutting...");
    }

    #[test]
    fn test_terminal_updates() {
        let mut job = Job::starting();
        job.apply(StatusUpdate::Completed {
            outputs: vec![output("a.mp4")],
            email_sent: false,
        });
        assert!(job.state.is_terminal());
        assert_eq!(job.outputs.len(), 1);
        assert!(job.finished_at.is_some());
        assert!(job.elapsed_secs().unwrap() >= 0);
    }
}
