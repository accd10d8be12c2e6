use crate::api::{ApiError, ProcessRequest, SegmentPayload, ShortsBackend};
use crate::options::ProcessOptions;
use crate::segments::Segment;
use std::sync::Arc;

pub const DEFAULT_PROJECT_NAME: &str = "My Short";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Please enter a YouTube URL")]
    MissingSourceUrl,

    #[error("No segments to submit")]
    NoSegments,

    #[error("Service did not return a project id")]
    MissingProjectId,

    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),
}

impl SubmitError {
    /// True for input problems caught before any request is sent
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::MissingSourceUrl | SubmitError::NoSegments)
    }
}

/// Sends processing requests and hands back the service's project id.
pub struct JobClient {
    backend: Arc<dyn ShortsBackend>,
    project_name: String,
}

impl JobClient {
    pub fn new(backend: Arc<dyn ShortsBackend>) -> Self {
        Self::with_project_name(backend, DEFAULT_PROJECT_NAME)
    }

    pub fn with_project_name(backend: Arc<dyn ShortsBackend>, project_name: impl Into<String>) -> Self {
        Self {
            backend,
            project_name: project_name.into(),
        }
    }

    /// Validates input and maps segments to the wire shape. Start/end order is
    /// left for the service to judge.
    pub fn build_request(
        &self,
        source_url: &str,
        segments: &[Segment],
        options: ProcessOptions,
    ) -> Result<ProcessRequest, SubmitError> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(SubmitError::MissingSourceUrl);
        }
        if segments.is_empty() {
            return Err(SubmitError::NoSegments);
        }

        Ok(ProcessRequest {
            youtube_url: source_url.to_string(),
            segments: segments.iter().map(SegmentPayload::from).collect(),
            project_name: self.project_name.clone(),
            resolution: options.resolution,
            color_grading: options.color_grading,
        })
    }

    pub async fn submit(
        &self,
        source_url: &str,
        segments: &[Segment],
        options: ProcessOptions,
    ) -> Result<String, SubmitError> {
        let request = self.build_request(source_url, segments, options)?;
        self.send(request).await
    }

    /// Sends an already validated request.
    pub async fn send(&self, request: ProcessRequest) -> Result<String, SubmitError> {
        tracing::info!(
            "Submitting {} segment(s) via {} ({}, grading={})",
            request.segments.len(),
            self.backend.name(),
            request.resolution,
            request.color_grading
        );

        let response = self.backend.process(&request).await?;
        let project_id = response
            .project_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(SubmitError::MissingProjectId)?;

        tracing::info!("Submission accepted: project_id={}", project_id);
        Ok(project_id)
    }
}
