// src/quote.rs
// One-shot quote card / quote video generation

use crate::api::{ApiError, QuoteRequest, ShortsBackend};
use crate::options::{QuoteCategory, QuoteFormat, QuoteLanguage};
use serde::Serialize;
use std::sync::Arc;

const VIDEO_SUFFIX: &str = ".mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Playable media when the URL ends in `.mp4`, otherwise a still image.
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(VIDEO_SUFFIX) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteResult {
    pub url: String,
    pub kind: MediaKind,
}

/// Stateless client: every call is an independent request with no retry.
#[derive(Clone)]
pub struct QuoteClient {
    backend: Arc<dyn ShortsBackend>,
}

impl QuoteClient {
    pub fn new(backend: Arc<dyn ShortsBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(
        &self,
        language: QuoteLanguage,
        category: QuoteCategory,
        format: QuoteFormat,
    ) -> Result<QuoteResult, ApiError> {
        let request = QuoteRequest {
            language,
            category,
            format,
        };

        let response = self.backend.generate_quote(&request).await?;
        let url = response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("quote response has no url".to_string()))?;

        tracing::info!("Quote generated ({}): {}", format, url);

        Ok(QuoteResult {
            kind: MediaKind::from_url(&url),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    #[test]
    fn test_media_kind_from_suffix() {
        assert_eq!(MediaKind::from_url("/output/quote_1.mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_url("/output/quote_1.png"), MediaKind::Image);
        assert_eq!(MediaKind::from_url("/output/quote_1.MP4"), MediaKind::Image);
    }

    #[tokio::test]
    async fn test_generate_sends_request_and_classifies() {
        let backend = Arc::new(
            ScriptedBackend::new().with_quote(Ok("/output/quote_abc.mp4".to_string())),
        );
        let client = QuoteClient::new(backend.clone());

        let result = client
            .generate(QuoteLanguage::Id, QuoteCategory::Islamic, QuoteFormat::Video)
            .await
            .unwrap();

        assert_eq!(result.kind, MediaKind::Video);
        assert_eq!(result.url, "/output/quote_abc.mp4");

        let calls = backend.quote_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].language, QuoteLanguage::Id);
        assert_eq!(calls[0].category, QuoteCategory::Islamic);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let backend = Arc::new(
            ScriptedBackend::new().with_quote(Err(ApiError::HttpError {
                status: 500,
                body: "fail".to_string(),
            })),
        );
        let client = QuoteClient::new(backend.clone());

        let result = client
            .generate(QuoteLanguage::En, QuoteCategory::Life, QuoteFormat::Image)
            .await;

        assert!(result.is_err());
        assert_eq!(backend.quote_calls.lock().unwrap().len(), 1);
    }
}
