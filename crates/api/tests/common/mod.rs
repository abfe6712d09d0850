#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use geovid_api::config::ServerConfig;
use geovid_api::router::build_app_router;
use geovid_api::state::AppState;
use geovid_core::error::CoreError;
use geovid_core::memory::{MemoryGeoStore, MemorySampleSource};
use geovid_core::store::{GeoStore, GeoStoreConnector};
use geovid_core::types::{Sample, SourceRow};
use geovid_pipeline::{IngestionPipeline, IntersectionService};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router with the same middleware stack as
/// production, backed by the given geo-store.
pub fn build_test_app(geo: Arc<dyn GeoStoreConnector>) -> Router {
    let config = test_config();
    let state = AppState {
        intersections: IntersectionService::new(geo),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

fn rows(video_id: &str, keywords: &str, samples: &[(f64, f64, f64)]) -> Vec<SourceRow> {
    samples
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng, time_code))| SourceRow {
            video_id: video_id.to_string(),
            fov_num: i as i64 + 1,
            keywords: Some(keywords.to_string()),
            sample: Sample {
                lat,
                lng,
                time_code,
                theta_x: 0.0,
                theta_y: 0.0,
                theta_z: 0.0,
                r: 30.0,
                alpha: 45.0,
            },
        })
        .collect()
}

/// Ingest a small corpus: V1 and V3 cross, V2 never moves, V4 is far away.
pub async fn ingested_store() -> MemoryGeoStore {
    let mut source = Vec::new();
    source.extend(rows("V1", "harbour", &[(10.0, 20.0, 0.0), (10.0, 20.0, 5.0), (11.0, 21.0, 10.0)]));
    source.extend(rows("V2", "parking", &[(5.0, 5.0, 0.0), (5.0, 5.0, 1.0)]));
    source.extend(rows("V3", "bridge", &[(11.0, 20.0, 0.0), (10.0, 21.0, 10.0)]));
    source.extend(rows("V4", "summit", &[(50.0, 50.0, 0.0), (51.0, 51.0, 1.0)]));

    let geo = MemoryGeoStore::new();
    IngestionPipeline::new(
        Arc::new(geo.clone()),
        Arc::new(MemorySampleSource::new(source)),
        2,
    )
    .run()
    .await
    .unwrap();
    geo
}

/// A geo-store whose connections are always refused.
pub struct UnreachableGeoStore;

#[async_trait]
impl GeoStoreConnector for UnreachableGeoStore {
    async fn connect(&self) -> Result<Box<dyn GeoStore>, CoreError> {
        Err(CoreError::Connection(
            "connection refused (geo-store.internal:5432)".into(),
        ))
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
