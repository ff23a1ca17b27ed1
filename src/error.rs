use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Convenience alias used throughout the handlers.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors surfaced at the request-handler boundary.
///
/// Everything here converts to an HTTP status plus a plain-text body;
/// nothing is retried internally and nothing crashes the process.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// A required query parameter was absent from the request.
    #[error("Missing required '{0}' query parameter")]
    MissingParameter(&'static str),

    /// The `url` parameter was rejected before any fetch was attempted.
    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    /// Network-level failure talking to the upstream server.
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    /// Upstream answered, but with a non-success status for a playlist fetch.
    #[error("Upstream returned status {0}")]
    UpstreamStatus(StatusCode),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::MissingParameter(_) | ProxyError::InvalidTargetUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::UpstreamFetch(_) | ProxyError::UpstreamStatus(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}
