//! Query parameter types for API handlers.

use serde::Deserialize;

/// `?videoID=` for intersection queries. `video_id` is accepted as well.
#[derive(Debug, Deserialize)]
pub struct VideoIdParams {
    #[serde(rename = "videoID", alias = "video_id")]
    pub video_id: Option<String>,
}
