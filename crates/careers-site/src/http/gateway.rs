use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::cache::FallbackCache;
use super::{HttpGateway, UpstreamError, UpstreamResponse};
use crate::config::UpstreamConfig;

/// reqwest-backed gateway with a stale-on-error fallback for GETs.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: Client,
    cache: FallbackCache,
}

impl ReqwestGateway {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("careers-site/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| UpstreamError::Transport {
                url: String::new(),
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            cache: FallbackCache::new(config.fallback_window),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| transport(url, err))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| UpstreamError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

fn transport(url: &str, err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        match self.fetch(url).await {
            Ok(payload) => {
                self.cache.store(url, payload.clone());
                Ok(payload)
            }
            Err(err) if err.is_not_found() => Err(err),
            Err(err) => match self.cache.recall(url) {
                Some(stale) => {
                    warn!(%url, error = %err, "upstream failed, serving cached payload");
                    Ok(stale)
                }
                None => {
                    warn!(%url, error = %err, "upstream failed with nothing cached");
                    Err(err)
                }
            },
        }
    }

    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        authorization: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .json(body)
            .send()
            .await
            .map_err(|err| transport(url, err))?;

        let status = response.status().as_u16();
        debug!(%url, status, "upstream accepted POST");
        Ok(UpstreamResponse::from_status(status))
    }
}
