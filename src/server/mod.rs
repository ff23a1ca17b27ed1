pub mod handlers;
pub mod state;
pub mod url_validation;

use crate::config::Config;
use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Build the router with all routes and cross-cutting layers.
///
/// Separate from [`start`] so tests can drive it with `tower::ServiceExt`
/// without binding a listener.
pub fn build_router(config: Config) -> Router {
    let state = AppState::new(config);

    // Browser players run on arbitrary origins; allow everything.
    // Preflight OPTIONS requests are answered by the layer itself.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route("/hls", get(handlers::playlist::serve_hls))
        .route("/segment", get(handlers::segment::serve_segment))
        .route("/license", post(handlers::license::serve_license))
        .route("/stream", get(handlers::stream::serve_stream))
        .layer(cors)
        .with_state(state)
}

/// Start the Axum HTTP server
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);

    let app = build_router(config);

    // Bind TCP listener
    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("🚀 Server listening on http://{}", addr);

    // Start serving
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
