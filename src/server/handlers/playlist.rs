use crate::error::Result;
use crate::proxy::rewriter::rewrite_playlist;
use crate::server::{
    handlers::{ProxyParams, require_url},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

/// Serve an HLS playlist with every reference rewritten to proxy form.
///
/// Master playlists get their variant URLs pointed back at this route;
/// media playlists get segment and key URLs pointed at `/segment`.
/// Content without playlist markers passes through untouched.
pub async fn serve_hls(
    Query(params): Query<ProxyParams>,
    State(state): State<AppState>,
) -> Result<Response> {
    let url = require_url(&params.url, &state)?;
    info!("Proxying playlist: {}", url);

    let content = state.upstream.fetch_text(url).await?;

    let rewritten = rewrite_playlist(&content, url, &state.config.public_base_path, params.debug);

    if params.debug {
        info!(
            "Rewrote playlist from {}: {} bytes in, {} bytes out",
            url,
            content.len(),
            rewritten.len()
        );
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")],
        rewritten,
    )
        .into_response())
}
