//! Row-level types shared by the sample source, the geometry builder and
//! the geo-store.

use serde::{Deserialize, Serialize};

use crate::geometry::{Location, Trajectory};

/// Video identifiers are the relational source's `VideoId` values.
pub type VideoId = String;

/// One observed camera pose.
///
/// `time_code` is the raw sort key read from the source; it is truncated to
/// an integer when the sample becomes a trajectory vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub lat: f64,
    pub lng: f64,
    pub time_code: f64,
    pub theta_x: f64,
    pub theta_y: f64,
    pub theta_z: f64,
    pub r: f64,
    pub alpha: f64,
}

impl Sample {
    /// Position as `(lat, lng)`, the source's natural order.
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// A single row of the relational sample table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub video_id: VideoId,
    /// Per-video frame sequence number; `1` marks the first frame.
    pub fov_num: i64,
    pub keywords: Option<String>,
    pub sample: Sample,
}

/// The first-frame row of a video that passed candidate selection.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoHeader {
    pub video_id: VideoId,
    pub lat: f64,
    pub lng: f64,
    pub keywords: Option<String>,
}

/// A video document as persisted in the geo-store and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: VideoId,
    pub keywords: Option<String>,
    pub location: Location,
    pub trajectory: Trajectory,
}
