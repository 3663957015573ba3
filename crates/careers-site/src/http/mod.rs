//! Outbound HTTP seam shared by the feed, relay and partner clients.
//!
//! Every upstream call goes through [`HttpGateway`], which is constructed once
//! at startup and handed to the clients. Production uses [`ReqwestGateway`];
//! tests and offline runs use [`StaticGateway`].

mod cache;
mod gateway;
mod stub;

pub use cache::FallbackCache;
pub use gateway::ReqwestGateway;
pub use stub::{RecordedRequest, StaticGateway};

use async_trait::async_trait;
use serde_json::Value;

/// Status line of an upstream response the caller wants passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub reason: String,
}

impl UpstreamResponse {
    pub fn from_status(status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Self { status, reason }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// GET `url` and decode the body as JSON. Non-success statuses are errors.
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError>;

    /// POST `body` as JSON with the given `Authorization` header value and
    /// return the upstream status untouched.
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        authorization: &str,
    ) -> Result<UpstreamResponse, UpstreamError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    #[error("{url} was not found upstream")]
    NotFound { url: String },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("unexpected payload from {url}: {message}")]
    Decode { url: String, message: String },
}

impl UpstreamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound { .. })
    }
}
