use crate::api::{ApiError, QuoteRequest, ShortsBackend};
use crate::config::AppConfig;
use crate::events::{self, emit, ControllerEvent, EventReceiver, EventSender, Notice};
use crate::job::client::DEFAULT_PROJECT_NAME;
use crate::job::poller::DEFAULT_POLL_INTERVAL;
use crate::job::{lock, Job, JobClient, StatusPoller, SubmitError};
use crate::options::ProcessOptions;
use crate::quote::{QuoteClient, QuoteResult};
use crate::segments::{parser, Segment, SegmentField, SegmentStore};
use crate::youtube;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SUBMITTED_NOTICE: &str = "Processing started! This may take a few minutes.";
const SUBMIT_FAILED_NOTICE: &str = "Failed to start processing.";
const QUOTE_NOTICE: &str = "Quote generated!";
const QUOTE_FAILED_NOTICE: &str = "Failed to generate quote";

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub project_name: String,
    pub poll_interval: Duration,
    pub options: ProcessOptions,
    pub quote: QuoteRequest,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            options: ProcessOptions::default(),
            quote: QuoteRequest::default(),
        }
    }
}

impl From<&AppConfig> for ControllerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            project_name: config.project_name.clone(),
            poll_interval: config.poll_interval(),
            options: config.process_options(),
            quote: QuoteRequest {
                language: config.quote.language,
                category: config.quote.category,
                format: config.quote.format,
            },
        }
    }
}

/// Everything the user edits before submitting.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub source_url: String,
    pub segments: SegmentStore,
    pub bulk_text: String,
    pub options: ProcessOptions,
    pub quote: QuoteRequest,
}

/// Drives one session: segment editing, job submission and status polling,
/// plus independent quote generation.
///
/// Tracks a single job. Submitting again supersedes the previous job and
/// cancels its polling; dropping the controller cancels polling too.
pub struct Controller {
    session: Session,
    job: Arc<Mutex<Job>>,
    backend: Arc<dyn ShortsBackend>,
    job_client: JobClient,
    quote_client: QuoteClient,
    poller: StatusPoller,
    latest_quote: Mutex<Option<(u64, QuoteResult)>>,
    quote_seq: AtomicU64,
    events: EventSender,
}

impl Controller {
    /// The returned receiver gets an event on every poll tick while a job is
    /// processing; keep reading it, or drop it.
    pub fn new(backend: Arc<dyn ShortsBackend>, settings: ControllerSettings) -> (Self, EventReceiver) {
        let (events, receiver) = events::channel();
        let session = Session {
            options: settings.options,
            quote: settings.quote,
            ..Session::default()
        };

        let controller = Self {
            session,
            job: Arc::new(Mutex::new(Job::default())),
            job_client: JobClient::with_project_name(backend.clone(), settings.project_name),
            quote_client: QuoteClient::new(backend.clone()),
            poller: StatusPoller::new(settings.poll_interval),
            backend,
            latest_quote: Mutex::new(None),
            quote_seq: AtomicU64::new(0),
            events,
        };
        (controller, receiver)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn set_source_url(&mut self, url: impl Into<String>) {
        self.session.source_url = url.into();
    }

    pub fn preview_video_id(&self) -> Option<String> {
        youtube::video_id(&self.session.source_url)
    }

    pub fn segments(&self) -> &[Segment] {
        self.session.segments.segments()
    }

    pub fn add_segment(&mut self) -> &[Segment] {
        self.session.segments.add()
    }

    pub fn remove_segment(&mut self, index: usize) -> &[Segment] {
        self.session.segments.remove(index)
    }

    pub fn update_segment(&mut self, index: usize, field: SegmentField, value: &str) -> &[Segment] {
        self.session.segments.update(index, field, value)
    }

    pub fn set_bulk_text(&mut self, text: impl Into<String>) {
        self.session.bulk_text = text.into();
    }

    /// Live count of ranges in the bulk text; nothing is applied.
    pub fn detected_clip_count(&self) -> usize {
        parser::count(&self.session.bulk_text)
    }

    /// Replace the segment list with the parsed bulk text.
    pub fn apply_bulk_text(&mut self) -> Option<usize> {
        match self.session.segments.apply_bulk(&self.session.bulk_text) {
            Ok(count) => {
                self.notify(Notice::success(format!("Parsed {} timestamp(s)", count)));
                Some(count)
            }
            Err(e) => {
                self.notify(Notice::error(e.to_string()));
                None
            }
        }
    }

    pub fn job(&self) -> Job {
        lock(&self.job).clone()
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.job).is_processing()
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_busy()
    }

    pub fn submit_label(&self) -> String {
        match self.session.segments.len() {
            1 => "Generate Short".to_string(),
            n => format!("Generate {} Shorts", n),
        }
    }

    /// Submit the current session and start polling the new job.
    ///
    /// Any job already tracked is discarded first. Validation failures send
    /// no request and leave the tracked job untouched.
    pub async fn submit(&mut self) -> Result<String, SubmitError> {
        let request = match self.job_client.build_request(
            &self.session.source_url,
            self.session.segments.segments(),
            self.session.options,
        ) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Submission rejected: {}", e);
                self.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        self.poller.stop();
        self.replace_job(Job::starting());

        match self.job_client.send(request).await {
            Ok(project_id) => {
                let snapshot = {
                    let mut job = lock(&self.job);
                    job.id = Some(project_id.clone());
                    job.clone()
                };
                emit(&self.events, ControllerEvent::JobChanged(snapshot));
                self.notify(Notice::success(SUBMITTED_NOTICE));

                self.poller.start(
                    project_id.clone(),
                    self.backend.clone(),
                    self.job.clone(),
                    self.events.clone(),
                );
                Ok(project_id)
            }
            Err(e) => {
                tracing::error!("Submission failed: {}", e);
                self.replace_job(Job::default());
                self.notify(Notice::error(SUBMIT_FAILED_NOTICE));
                Err(e)
            }
        }
    }

    /// Generate a quote with the session's quote settings.
    ///
    /// Calls may overlap; the result of the most recently started call is the
    /// one kept as `latest_quote`.
    pub async fn generate_quote(&self) -> Result<QuoteResult, ApiError> {
        let seq = self.quote_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let request = self.session.quote;

        match self
            .quote_client
            .generate(request.language, request.category, request.format)
            .await
        {
            Ok(result) => {
                if let Ok(mut latest) = self.latest_quote.lock() {
                    let newer = latest.as_ref().map_or(true, |(held, _)| seq > *held);
                    if newer {
                        *latest = Some((seq, result.clone()));
                    }
                }
                self.notify(Notice::success(QUOTE_NOTICE));
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Quote generation failed: {}", e);
                self.notify(Notice::error(QUOTE_FAILED_NOTICE));
                Err(e)
            }
        }
    }

    pub fn latest_quote(&self) -> Option<QuoteResult> {
        self.latest_quote
            .lock()
            .ok()
            .and_then(|latest| latest.as_ref().map(|(_, result)| result.clone()))
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Stop polling. Safe to call repeatedly.
    pub fn shutdown(&self) {
        self.poller.stop();
    }

    fn replace_job(&self, job: Job) {
        let snapshot = {
            let mut current = lock(&self.job);
            *current = job;
            current.clone()
        };
        emit(&self.events, ControllerEvent::JobChanged(snapshot));
    }

    fn notify(&self, notice: Notice) {
        emit(&self.events, ControllerEvent::Notice(notice));
    }
}
