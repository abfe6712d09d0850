use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the geo-store is reachable.
    pub geo_store_healthy: bool,
}

/// GET /health -- returns service and geo-store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let geo_store_healthy = match state.intersections.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Geo-store health check failed");
            false
        }
    };

    let status = if geo_store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        geo_store_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
