use crate::error::Result;
use crate::server::{
    handlers::{ProxyParams, relay_response, require_url},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use tracing::info;

/// Generic forwarder, kept for DASH manifest support.
///
/// DASH manifests reference segments by absolute template URLs, so no
/// rewriting is needed — the manifest and everything it points at relay
/// straight through. `.mpd` targets get the DASH content-type explicitly
/// since some origins serve them as text/xml.
pub async fn serve_stream(
    Query(params): Query<ProxyParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let url = require_url(&params.url, &state)?;
    info!("Proxying stream: {}", url);

    let upstream = state.upstream.fetch_raw(url, headers.get(header::RANGE)).await?;

    if params.debug {
        info!("Upstream stream response: {}", upstream.status());
    }

    let is_mpd = url
        .split(['?', '#'])
        .next()
        .is_some_and(|path| path.to_ascii_lowercase().ends_with(".mpd"));
    let content_type = is_mpd.then(|| HeaderValue::from_static("application/dash+xml"));

    Ok(relay_response(upstream, content_type))
}
