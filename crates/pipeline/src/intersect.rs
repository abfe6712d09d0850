//! Intersection queries against the geo-store.

use std::sync::Arc;

use geovid_core::error::CoreError;
use geovid_core::store::{GeoStore, GeoStoreConnector};
use geovid_core::types::VideoRecord;

/// Answers "which videos cross this video's path".
///
/// Every call opens its own geo-store connection and closes it before
/// returning; nothing is shared between requests.
#[derive(Clone)]
pub struct IntersectionService {
    geo: Arc<dyn GeoStoreConnector>,
}

impl IntersectionService {
    pub fn new(geo: Arc<dyn GeoStoreConnector>) -> Self {
        Self { geo }
    }

    /// All videos other than `video_id` whose trajectory intersects its
    /// trajectory. Result order is unspecified.
    ///
    /// Fails with [`CoreError::NotFound`] when the video is not in the corpus.
    pub async fn find_intersecting(&self, video_id: &str) -> Result<Vec<VideoRecord>, CoreError> {
        if video_id.trim().is_empty() {
            return Err(CoreError::Validation("videoID must not be empty".into()));
        }

        let mut store = self.geo.connect().await?;
        let result = query_intersecting(store.as_mut(), video_id).await;
        let closed = store.close().await;
        settle(result, closed)
    }

    /// Open, ping and close a geo-store connection.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        let mut store = self.geo.connect().await?;
        let result = store.ping().await;
        let closed = store.close().await;
        settle(result, closed)
    }
}

async fn query_intersecting(
    store: &mut dyn GeoStore,
    video_id: &str,
) -> Result<Vec<VideoRecord>, CoreError> {
    let trajectory = store
        .find_trajectory(video_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Video",
            id: video_id.to_string(),
        })?;

    let videos = store.find_intersecting(video_id, &trajectory).await?;
    tracing::info!(video_id, count = videos.len(), "Number of intersecting videos found");
    Ok(videos)
}

/// Combine an operation result with the result of closing its connection.
///
/// The operation's own error wins; a close failure after a successful
/// operation is still reported.
fn settle<T>(result: Result<T, CoreError>, closed: Result<(), CoreError>) -> Result<T, CoreError> {
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            tracing::warn!(error = %close_err, "Failed to close geo-store connection");
            Err(err)
        }
    }
}
