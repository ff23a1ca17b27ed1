//! Request handlers plus the relay plumbing they share.

pub mod health;
pub mod license;
pub mod playlist;
pub mod segment;
pub mod stream;

use crate::error::{ProxyError, Result};
use crate::server::{state::AppState, url_validation::validate_target_url};
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

/// Query parameters shared by the GET proxy endpoints.
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
    /// Verbose request/response logging plus a playlist diagnostic banner
    #[serde(default)]
    pub debug: bool,
}

/// Extract and validate the required `url` parameter.
///
/// Rejection happens before any upstream fetch is attempted.
pub(crate) fn require_url<'a>(url: &'a Option<String>, state: &AppState) -> Result<&'a str> {
    let url = url.as_deref().ok_or(ProxyError::MissingParameter("url"))?;
    validate_target_url(url, state.config.allow_private_upstreams)?;
    Ok(url)
}

/// Headers never copied from upstream responses: hop-by-hop headers, and
/// CORS headers (ours come from the router's CorsLayer — forwarding the
/// upstream's would duplicate them).
const SKIPPED_RESPONSE_HEADERS: [&str; 3] = ["connection", "transfer-encoding", "keep-alive"];

/// Relay an upstream response to the client: status, headers, and a
/// streamed body, without buffering the payload.
///
/// `content_type` overrides the upstream Content-Type when `Some`.
pub(crate) fn relay_response(
    upstream: reqwest::Response,
    content_type: Option<HeaderValue>,
) -> Response {
    let status = upstream.status();

    let mut headers = HeaderMap::new();
    for (name, value) in upstream.headers() {
        let lower = name.as_str();
        if SKIPPED_RESPONSE_HEADERS.contains(&lower) || lower.starts_with("access-control-") {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }

    let body = Body::from_stream(upstream.bytes_stream());

    (status, headers, body).into_response()
}

/// Infer a Content-Type from the target URL's file extension, for upstreams
/// that omit the header. Query string and fragment are ignored.
pub(crate) fn infer_content_type(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();

    if path.ends_with(".m3u8") {
        "application/vnd.apple.mpegurl"
    } else if path.ends_with(".mpd") {
        "application/dash+xml"
    } else if path.ends_with(".ts") {
        "video/mp2t"
    } else if path.ends_with(".aac") {
        "audio/aac"
    } else if path.ends_with(".mp4") || path.ends_with(".m4s") {
        "video/mp4"
    } else if path.ends_with(".vtt") {
        "text/vtt"
    } else {
        "application/octet-stream"
    }
}
