use super::{lock, Job, JobState, StatusUpdate};
use crate::api::{ApiError, ShortsBackend, StatusResponse};
use crate::events::{emit, ControllerEvent, EventSender, Notice};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const COMPLETED_NOTICE: &str = "All videos generated successfully!";
const EMAIL_NOTICE: &str = " Check your email for download links!";

struct ActivePoll {
    job_id: String,
    handle: JoinHandle<()>,
}

/// Polls job status on a fixed interval until the job reaches a terminal state.
///
/// Owns at most one polling task. Starting a new one aborts the previous task,
/// and `stop` may be called any number of times.
pub struct StatusPoller {
    interval: Duration,
    active: Mutex<Option<ActivePoll>>,
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: Mutex::new(None),
        }
    }

    /// Begin polling `job_id`. Requires a tokio runtime.
    pub fn start(
        &self,
        job_id: String,
        backend: Arc<dyn ShortsBackend>,
        job: Arc<Mutex<Job>>,
        events: EventSender,
    ) {
        let handle = tokio::spawn(poll_loop(
            job_id.clone(),
            backend,
            job,
            events,
            self.interval,
        ));

        if let Ok(mut guard) = self.active.lock() {
            if let Some(previous) = guard.take() {
                tracing::info!("Superseding poll for job {}", previous.job_id);
                previous.handle.abort();
            }
            *guard = Some(ActivePoll { job_id, handle });
        }
    }

    pub fn stop(&self) {
        if let Ok(mut guard) = self.active.lock() {
            if let Some(previous) = guard.take() {
                tracing::debug!("Stopping poll for job {}", previous.job_id);
                previous.handle.abort();
            }
        }
    }

    /// Id of the job whose polling task is still running.
    pub fn active_job_id(&self) -> Option<String> {
        let guard = self.active.lock().ok()?;
        guard
            .as_ref()
            .filter(|poll| !poll.handle.is_finished())
            .map(|poll| poll.job_id.clone())
    }

    pub fn is_active(&self) -> bool {
        self.active_job_id().is_some()
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    job_id: String,
    backend: Arc<dyn ShortsBackend>,
    job: Arc<Mutex<Job>>,
    events: EventSender,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Queries still in flight. Dropping the set with this task aborts them.
    let mut queries: JoinSet<Result<StatusResponse, ApiError>> = JoinSet::new();

    tracing::info!("Polling job {} every {}ms", job_id, period.as_millis());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !is_tracking(&job, &job_id) {
                    tracing::debug!("Job {} no longer tracked, stopping poll", job_id);
                    break;
                }
                if !queries.is_empty() {
                    tracing::debug!("Job {}: {} status query(s) still pending", job_id, queries.len());
                }

                let backend = backend.clone();
                let id = job_id.clone();
                queries.spawn(async move { backend.status(&id).await });
            }
            Some(joined) = queries.join_next() => {
                let response = match joined {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) if e.is_transient() => {
                        tracing::warn!("Polling error for job {}: {}", job_id, e);
                        continue;
                    }
                    Ok(Err(e)) => {
                        tracing::error!("Status query for job {} rejected: {}", job_id, e);
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Status query task for job {} ended: {}", job_id, e);
                        continue;
                    }
                };

                if !apply_response(&job_id, &job, &events, response) {
                    break;
                }
            }
        }
    }
}

/// Applies one status response to the tracked job and publishes the result.
/// Returns false once polling should end.
fn apply_response(
    job_id: &str,
    job: &Mutex<Job>,
    events: &EventSender,
    response: StatusResponse,
) -> bool {
    let Some(update) = StatusUpdate::classify(response) else {
        tracing::debug!("Job {}: response without status ignored", job_id);
        return true;
    };
    let state = update.state();

    let snapshot = {
        let mut current = lock(job);
        if current.id.as_deref() != Some(job_id) || !current.is_processing() {
            return false;
        }
        let changed = current.apply(update);
        changed.then(|| current.clone())
    };

    tracing::debug!("Job {} status: {:?}", job_id, state);
    emit(
        events,
        ControllerEvent::StatusPolled {
            job_id: job_id.to_string(),
            state,
        },
    );

    let Some(snapshot) = snapshot else {
        return true;
    };

    // Notice before the terminal snapshot; listeners may stop reading there.
    match state {
        JobState::Completed => {
            tracing::info!(
                "Job {} completed: {} output(s), email_sent={}",
                job_id,
                snapshot.outputs.len(),
                snapshot.email_sent
            );
            let email_note = if snapshot.email_sent { EMAIL_NOTICE } else { "" };
            emit(
                events,
                ControllerEvent::Notice(Notice::success(format!(
                    "{}{}",
                    COMPLETED_NOTICE, email_note
                ))),
            );
            emit(events, ControllerEvent::JobChanged(snapshot));
            false
        }
        JobState::Error => {
            tracing::error!("Job {} failed: {}", job_id, snapshot.message);
            let message = format!("Error: {}", snapshot.message);
            emit(events, ControllerEvent::Notice(Notice::error(message)));
            emit(events, ControllerEvent::JobChanged(snapshot));
            false
        }
        _ => {
            tracing::info!("Job {}: {}", job_id, snapshot.message);
            emit(events, ControllerEvent::JobChanged(snapshot));
            true
        }
    }
}

fn is_tracking(job: &Mutex<Job>, job_id: &str) -> bool {
    let current = lock(job);
    current.id.as_deref() == Some(job_id) && current.is_processing()
}
