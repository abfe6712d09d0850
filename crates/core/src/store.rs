//! Store contracts.
//!
//! The ingestion pipeline and the intersection query only talk to the
//! relational source and the geo-store through these traits. Each connector
//! opens a fresh session per call; sessions must be closed by the caller on
//! both success and failure paths.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::geometry::Trajectory;
use crate::types::{Sample, VideoHeader, VideoRecord};

/// Geometry fields of a video document that carry a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GeoField {
    Trajectory,
    Location,
}

impl GeoField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trajectory => "trajectory",
            Self::Location => "location",
        }
    }
}

impl std::fmt::Display for GeoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Relational source
// ---------------------------------------------------------------------------

/// Read-only view of the per-frame sample table.
///
/// Methods take `&self` so that sample loads for different videos can run
/// concurrently on one session.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// First-frame header of every video with at least two distinct positions.
    async fn select_candidates(&self) -> Result<Vec<VideoHeader>, CoreError>;

    /// All samples of one video, ordered by ascending time code.
    async fn load_samples(&self, video_id: &str) -> Result<Vec<Sample>, CoreError>;

    async fn close(self: Box<Self>) -> Result<(), CoreError>;
}

#[async_trait]
pub trait SampleSourceConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SampleSource>, CoreError>;
}

// ---------------------------------------------------------------------------
// Geo-store
// ---------------------------------------------------------------------------

/// A session on the geo-indexed video collection.
#[async_trait]
pub trait GeoStore: Send {
    /// Remove every video. Returns the number of removed documents.
    async fn clear(&mut self) -> Result<u64, CoreError>;

    /// Insert all videos in one batch. Returns the number inserted.
    async fn insert_many(&mut self, videos: &[VideoRecord]) -> Result<u64, CoreError>;

    /// Create a spherical spatial index on `field`; no-op if it exists.
    async fn create_spatial_index(&mut self, field: GeoField) -> Result<(), CoreError>;

    /// Fetch only the trajectory of one video.
    async fn find_trajectory(&mut self, video_id: &str) -> Result<Option<Trajectory>, CoreError>;

    /// Every video other than `exclude` whose trajectory intersects `geometry`.
    async fn find_intersecting(
        &mut self,
        exclude: &str,
        geometry: &Trajectory,
    ) -> Result<Vec<VideoRecord>, CoreError>;

    /// Round-trip to the store without touching the collection.
    async fn ping(&mut self) -> Result<(), CoreError>;

    async fn close(self: Box<Self>) -> Result<(), CoreError>;
}

#[async_trait]
pub trait GeoStoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn GeoStore>, CoreError>;
}
