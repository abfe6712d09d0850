use std::sync::Arc;

use geovid_pipeline::IntersectionService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Intersection queries; opens one geo-store connection per request.
    pub intersections: IntersectionService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
