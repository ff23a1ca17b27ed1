use crate::error::Result;
use crate::server::{
    handlers::{relay_response, require_url},
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::Response,
};
use serde::Deserialize;
use tracing::info;

/// Query parameters for the DRM license relay.
#[derive(Debug, Deserialize)]
pub struct LicenseParams {
    pub url: Option<String>,
    /// Opaque key injected as `Authorization: Bearer <key>` upstream
    pub key: Option<String>,
}

/// Relay a DRM license request to the license server.
///
/// The request body is forwarded byte-for-byte; the key, when supplied, is
/// passed through opaquely as a bearer token. No key-exchange logic lives
/// here — the response streams back with its original headers.
pub async fn serve_license(
    Query(params): Query<LicenseParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let url = require_url(&params.url, &state)?;
    info!("Relaying license request to: {}", url);

    let upstream = state
        .upstream
        .post(
            url,
            body,
            headers.get(header::CONTENT_TYPE),
            params.key.as_deref(),
        )
        .await?;

    Ok(relay_response(upstream, None))
}
