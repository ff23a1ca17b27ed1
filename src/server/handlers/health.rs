use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Liveness probe; also served at `/`.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "streamgate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
