use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{HttpGateway, UpstreamError, UpstreamResponse};

/// A request observed by [`StaticGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

/// In-memory gateway answering from canned payloads. Unknown GET URLs are
/// reported as not found; POSTs default to `200 OK` unless statuses were
/// queued for the URL.
#[derive(Debug, Default)]
pub struct StaticGateway {
    payloads: Mutex<HashMap<String, Result<Value, UpstreamError>>>,
    post_statuses: Mutex<HashMap<String, VecDeque<Result<u16, UpstreamError>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: impl Into<String>, payload: Value) -> Self {
        lock(&self.payloads).insert(url.into(), Ok(payload));
        self
    }

    pub fn with_failure(self, url: impl Into<String>, error: UpstreamError) -> Self {
        lock(&self.payloads).insert(url.into(), Err(error));
        self
    }

    pub fn with_post_status(self, url: impl Into<String>, status: u16) -> Self {
        lock(&self.post_statuses)
            .entry(url.into())
            .or_default()
            .push_back(Ok(status));
        self
    }

    pub fn with_post_failure(self, url: impl Into<String>, error: UpstreamError) -> Self {
        lock(&self.post_statuses)
            .entry(url.into())
            .or_default()
            .push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == "POST")
            .collect()
    }

    fn record(&self, request: RecordedRequest) {
        lock(&self.requests).push(request);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl HttpGateway for StaticGateway {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.record(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            body: None,
            authorization: None,
        });

        lock(&self.payloads)
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamError::NotFound {
                    url: url.to_string(),
                })
            })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        authorization: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.record(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
            authorization: Some(authorization.to_string()),
        });

        let queued = lock(&self.post_statuses)
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(Ok(status)) => Ok(UpstreamResponse::from_status(status)),
            Some(Err(err)) => Err(err),
            None => Ok(UpstreamResponse::from_status(200)),
        }
    }
}
