use crate::careers::FeedError;
use crate::config::ConfigError;
use crate::http::UpstreamError;
use crate::partners::PartnerError;
use crate::telemetry::TelemetryError;
use crate::views::pages::render_error;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt;
use tracing::{error, warn};

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Upstream(UpstreamError),
    Feed(FeedError),
    Partners(PartnerError),
    Upload(MultipartError),
    NotFound(String),
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Feed(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Upstream(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(err) => err.status(),
            AppError::Feed(_) | AppError::Partners(_) | AppError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Upstream(err) => write!(f, "upstream error: {}", err),
            AppError::Feed(err) => write!(f, "job feed error: {}", err),
            AppError::Partners(err) => write!(f, "partner directory error: {}", err),
            AppError::Upload(err) => write!(f, "upload rejected: {}", err.body_text()),
            AppError::NotFound(path) => write!(f, "{} could not be found", path),
            AppError::BadRequest(reason) => write!(f, "bad request: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Upstream(err) => Some(err),
            AppError::Feed(err) => Some(err),
            AppError::Partners(err) => Some(err),
            AppError::Upload(err) => Some(err),
            AppError::NotFound(_) | AppError::BadRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::BAD_GATEWAY => warn!(error = %self, "upstream unavailable"),
            StatusCode::INTERNAL_SERVER_ERROR => error!(error = %self, "request failed"),
            _ => {}
        }

        let body = render_error(status.as_u16(), &self.to_string());
        (status, Html(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<UpstreamError> for AppError {
    fn from(value: UpstreamError) -> Self {
        Self::Upstream(value)
    }
}

impl From<FeedError> for AppError {
    fn from(value: FeedError) -> Self {
        Self::Feed(value)
    }
}

impl From<PartnerError> for AppError {
    fn from(value: PartnerError) -> Self {
        Self::Partners(value)
    }
}

impl From<MultipartError> for AppError {
    fn from(value: MultipartError) -> Self {
        Self::Upload(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            AppError::Feed(FeedError::NotFound { job_id: 1 }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Feed(FeedError::Upstream(UpstreamError::Status {
                url: "https://boards.example.test".to_string(),
                status: 500,
            }))
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotFound("/careers/nowhere".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("broken multipart".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn bad_gateway_page_names_upstream_failure() {
        let response = AppError::Upstream(UpstreamError::Transport {
            url: "https://partners.example.test".to_string(),
            message: "timed out".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
