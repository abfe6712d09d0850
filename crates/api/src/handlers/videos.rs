//! Handlers for the `/videos` resource.

use axum::extract::{Query, State};
use axum::Json;
use geovid_core::types::VideoRecord;

use crate::error::{AppError, AppResult};
use crate::query::VideoIdParams;
use crate::state::AppState;

/// GET /api/v1/videos/intersections?videoID={id}
///
/// Returns every other video whose trajectory intersects the trajectory of
/// `videoID`, as full documents in a JSON array.
pub async fn find_intersecting(
    State(state): State<AppState>,
    Query(params): Query<VideoIdParams>,
) -> AppResult<Json<Vec<VideoRecord>>> {
    let video_id = params
        .video_id
        .ok_or_else(|| AppError::BadRequest("videoID query parameter is required".into()))?;

    let videos = state.intersections.find_intersecting(&video_id).await?;

    Ok(Json(videos))
}
