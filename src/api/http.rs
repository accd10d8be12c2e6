// src/api/http.rs
// HTTP backend for the processing service

use super::{
    ApiError, OutputFile, ProcessRequest, ProcessResponse, QuoteRequest, QuoteResponse,
    ShortsBackend, StatusResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    /// Backend rooted at `base_url`. `timeout` applies per request when set;
    /// by default requests wait as long as the service takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        tracing::info!("HTTP backend initialized: {}", base_url);

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute location of an artifact. Relative paths such as
    /// `/output/clip.mp4` or `/clips/clip.mp4` resolve against the base address.
    pub fn artifact_url(&self, raw: &str) -> Result<Url, ApiError> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base_url
                .join(raw)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e))),
        }
    }

    /// Download one artifact into `dir`, named after its reported filename.
    pub async fn download_artifact(&self, output: &OutputFile, dir: &Path) -> Result<PathBuf, ApiError> {
        let file_name = Path::new(&output.filename)
            .file_name()
            .ok_or_else(|| ApiError::InvalidResponse(format!("Bad filename: {:?}", output.filename)))?;
        let dest = dir.join(file_name);
        let url = self.artifact_url(&output.url)?;

        tracing::info!("Downloading {} -> {}", url, dest.display());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&dest, &bytes).await?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(dest)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ShortsBackend for HttpBackend {
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse, ApiError> {
        let url = self.endpoint(&["api", "process"])?;
        tracing::debug!(
            "POST {} ({} segments, {}, {})",
            url,
            request.segments.len(),
            request.resolution,
            request.color_grading
        );

        let response = self.client.post(url).json(request).send().await?;
        Self::read_json(response).await
    }

    async fn status(&self, project_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint(&["api", "status", project_id])?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn generate_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ApiError> {
        let url = self.endpoint(&["api", "generate-quote"])?;
        tracing::debug!(
            "POST {} (language={}, category={}, format={})",
            url,
            request.language,
            request.category,
            request.format
        );

        let response = self.client.post(url).json(request).send().await?;
        Self::read_json(response).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
