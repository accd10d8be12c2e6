// src/api/types.rs
// Wire types and error definitions for the processing service

use crate::options::{ColorGrading, QuoteCategory, QuoteFormat, QuoteLanguage, Resolution};
use crate::segments::Segment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One clip range as the service expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPayload {
    pub start_time: String,
    pub end_time: String,
}

impl From<&Segment> for SegmentPayload {
    fn from(segment: &Segment) -> Self {
        Self {
            start_time: segment.start.clone(),
            end_time: segment.end.clone(),
        }
    }
}

/// Body of `POST /api/process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub youtube_url: String,
    pub segments: Vec<SegmentPayload>,
    pub project_name: String,
    pub resolution: Resolution,
    pub color_grading: ColorGrading,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A generated artifact reported by a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub filename: String,
    pub url: String,
}

/// Body of `GET /api/status/:project_id`.
///
/// `status` is kept as raw text: anything other than "completed" or "error"
/// means the job is still running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub outputs: Option<Vec<OutputFile>>,
    #[serde(default)]
    pub email_sent: Option<bool>,
}

impl StatusResponse {
    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            status: "processing".to_string(),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn completed(outputs: Vec<OutputFile>, email_sent: bool) -> Self {
        Self {
            status: "completed".to_string(),
            message: Some("All clips processed".to_string()),
            outputs: Some(outputs),
            email_sent: Some(email_sent),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/generate-quote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub language: QuoteLanguage,
    pub category: QuoteCategory,
    pub format: QuoteFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub url: Option<String>,
}

/// Errors talking to the processing service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    TimeoutError,

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Returns true if a later identical request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::TimeoutError => true,
            ApiError::HttpError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::TimeoutError
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::NetworkError(e.to_string())
        }
    }
}
