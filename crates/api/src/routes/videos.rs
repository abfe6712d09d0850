//! Route definitions for video queries.
//!
//! Mounted at `/videos`.
//!
//! ```text
//! GET  /intersections?videoID={id}                     find_intersecting
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/intersections", get(videos::find_intersecting))
}
