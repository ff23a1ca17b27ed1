use crate::error::Result;
use crate::server::{
    handlers::{ProxyParams, infer_content_type, relay_response, require_url},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use tracing::{debug, info};

/// Stream a media segment (or key) from upstream to the player.
///
/// The inbound `Range` header is forwarded so seeking works, and the
/// upstream status (200/206/404/...) plus range headers are relayed as-is.
/// Bytes are streamed through without buffering; no rewriting happens here.
pub async fn serve_segment(
    Query(params): Query<ProxyParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let url = require_url(&params.url, &state)?;
    info!("Proxying segment: {}", url);

    let range = headers.get(header::RANGE);
    if params.debug
        && let Some(range) = range
    {
        debug!("Forwarding range request: {:?}", range);
    }

    let upstream = state.upstream.fetch_raw(url, range).await?;

    if params.debug {
        info!(
            "Upstream segment response: {} (content-type {:?})",
            upstream.status(),
            upstream.headers().get(header::CONTENT_TYPE)
        );
    }

    // Some CDNs omit Content-Type on segments; fall back to the extension.
    let content_type = if upstream.headers().contains_key(header::CONTENT_TYPE) {
        None
    } else {
        Some(HeaderValue::from_static(infer_content_type(url)))
    };

    Ok(relay_response(upstream, content_type))
}
