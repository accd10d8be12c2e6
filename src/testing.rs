// Scripted in-memory backend shared by unit tests

use crate::api::{
    ApiError, ProcessRequest, ProcessResponse, QuoteRequest, QuoteResponse, ShortsBackend,
    StatusResponse,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedBackend {
    project_ids: Mutex<VecDeque<Result<String, ApiError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<StatusResponse, ApiError>>>>,
    quotes: Mutex<VecDeque<Result<String, ApiError>>>,
    pub process_calls: Mutex<Vec<ProcessRequest>>,
    pub status_calls: Mutex<Vec<String>>,
    pub quote_calls: Mutex<Vec<QuoteRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept_as(self, project_id: &str) -> Self {
        self.project_ids
            .lock()
            .unwrap()
            .push_back(Ok(project_id.to_string()));
        self
    }

    pub fn reject_submission(self, error: ApiError) -> Self {
        self.project_ids.lock().unwrap().push_back(Err(error));
        self
    }

    /// Status responses returned in order for `project_id`; once exhausted the
    /// job reports "processing" forever.
    pub fn with_statuses(
        self,
        project_id: &str,
        responses: Vec<Result<StatusResponse, ApiError>>,
    ) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(project_id.to_string(), responses.into());
        self
    }

    pub fn with_quote(self, result: Result<String, ApiError>) -> Self {
        self.quotes.lock().unwrap().push_back(result);
        self
    }

    pub fn status_calls_for(&self, project_id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == project_id)
            .count()
    }
}

#[async_trait]
impl ShortsBackend for ScriptedBackend {
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse, ApiError> {
        self.process_calls.lock().unwrap().push(request.clone());
        let next = self
            .project_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::NetworkError("no scripted submission".into())));
        next.map(|id| ProcessResponse {
            project_id: Some(id),
            message: Some("Processing started".to_string()),
        })
    }

    async fn status(&self, project_id: &str) -> Result<StatusResponse, ApiError> {
        self.status_calls.lock().unwrap().push(project_id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .get_mut(project_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(StatusResponse::processing("Processing...")))
    }

    async fn generate_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ApiError> {
        self.quote_calls.lock().unwrap().push(*request);
        let next = self
            .quotes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::NetworkError("no scripted quote".into())));
        next.map(|url| QuoteResponse { url: Some(url) })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
