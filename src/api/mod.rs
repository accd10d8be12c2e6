// src/api/mod.rs
// Processing service client seam

mod http;
mod types;

pub use http::HttpBackend;
pub use types::{
    ApiError, OutputFile, ProcessRequest, ProcessResponse, QuoteRequest, QuoteResponse,
    SegmentPayload, StatusResponse,
};

use async_trait::async_trait;

/// Remote side of the controller: job submission, status queries and quotes.
#[async_trait]
pub trait ShortsBackend: Send + Sync {
    /// Start processing a source video; returns the service's acknowledgement
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse, ApiError>;

    /// Current status of a previously submitted project
    async fn status(&self, project_id: &str) -> Result<StatusResponse, ApiError>;

    /// Generate a quote card or video
    async fn generate_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ApiError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
