//! In-memory store implementations.
//!
//! Used by tests and local dry runs. Intersection is evaluated on the plane
//! in `(lng, lat)` coordinates with `geo`, which agrees with the spherical
//! test of the PostGIS store for paths that do not span large distances.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use geo::Intersects;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::geometry::{build_location, Trajectory};
use crate::selection::has_distinct_positions;
use crate::store::{GeoField, GeoStore, GeoStoreConnector, SampleSource, SampleSourceConnector};
use crate::types::{Sample, SourceRow, VideoHeader, VideoRecord};

// ---------------------------------------------------------------------------
// Sample source
// ---------------------------------------------------------------------------

/// A fixed set of source rows, in table order.
#[derive(Debug, Clone, Default)]
pub struct MemorySampleSource {
    rows: Arc<Vec<SourceRow>>,
}

impl MemorySampleSource {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    fn samples_of(&self, video_id: &str) -> Vec<Sample> {
        self.rows
            .iter()
            .filter(|row| row.video_id == video_id)
            .map(|row| row.sample)
            .collect()
    }
}

#[async_trait]
impl SampleSource for MemorySampleSource {
    async fn select_candidates(&self) -> Result<Vec<VideoHeader>, CoreError> {
        let headers = self
            .rows
            .iter()
            .filter(|row| row.fov_num == 1)
            .filter(|row| has_distinct_positions(&self.samples_of(&row.video_id)))
            .map(|row| VideoHeader {
                video_id: row.video_id.clone(),
                lat: row.sample.lat,
                lng: row.sample.lng,
                keywords: row.keywords.clone(),
            })
            .collect();
        Ok(headers)
    }

    async fn load_samples(&self, video_id: &str) -> Result<Vec<Sample>, CoreError> {
        let mut samples = self.samples_of(video_id);
        samples.sort_by(|a, b| a.time_code.total_cmp(&b.time_code));
        Ok(samples)
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        Ok(())
    }
}

#[async_trait]
impl SampleSourceConnector for MemorySampleSource {
    async fn connect(&self) -> Result<Box<dyn SampleSource>, CoreError> {
        Ok(Box::new(self.clone()))
    }
}

// ---------------------------------------------------------------------------
// Geo-store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Corpus {
    videos: Vec<VideoRecord>,
    indexes: BTreeSet<GeoField>,
}

/// A shared in-memory video collection. Cloning shares the same corpus.
#[derive(Debug, Clone, Default)]
pub struct MemoryGeoStore {
    corpus: Arc<RwLock<Corpus>>,
}

impl MemoryGeoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored videos, in insertion order.
    pub async fn videos(&self) -> Vec<VideoRecord> {
        self.corpus.read().await.videos.clone()
    }

    /// Fields that currently carry a spatial index.
    pub async fn indexes(&self) -> Vec<GeoField> {
        self.corpus.read().await.indexes.iter().copied().collect()
    }
}

#[async_trait]
impl GeoStoreConnector for MemoryGeoStore {
    async fn connect(&self) -> Result<Box<dyn GeoStore>, CoreError> {
        Ok(Box::new(MemoryGeoSession {
            corpus: Arc::clone(&self.corpus),
        }))
    }
}

struct MemoryGeoSession {
    corpus: Arc<RwLock<Corpus>>,
}

#[async_trait]
impl GeoStore for MemoryGeoSession {
    async fn clear(&mut self) -> Result<u64, CoreError> {
        let mut corpus = self.corpus.write().await;
        let removed = corpus.videos.len() as u64;
        corpus.videos.clear();
        Ok(removed)
    }

    async fn insert_many(&mut self, videos: &[VideoRecord]) -> Result<u64, CoreError> {
        let mut corpus = self.corpus.write().await;

        let mut seen: BTreeSet<&str> = corpus.videos.iter().map(|v| v.video_id.as_str()).collect();
        for video in videos {
            if !seen.insert(video.video_id.as_str()) {
                return Err(CoreError::Query(format!(
                    "duplicate video_id '{}'",
                    video.video_id
                )));
            }
        }

        corpus.videos.extend_from_slice(videos);
        Ok(videos.len() as u64)
    }

    async fn create_spatial_index(&mut self, field: GeoField) -> Result<(), CoreError> {
        self.corpus.write().await.indexes.insert(field);
        Ok(())
    }

    async fn find_trajectory(&mut self, video_id: &str) -> Result<Option<Trajectory>, CoreError> {
        let corpus = self.corpus.read().await;
        Ok(corpus
            .videos
            .iter()
            .find(|v| v.video_id == video_id)
            .map(|v| v.trajectory.clone()))
    }

    async fn find_intersecting(
        &mut self,
        exclude: &str,
        geometry: &Trajectory,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        let query = geometry.to_line_string();
        let corpus = self.corpus.read().await;
        Ok(corpus
            .videos
            .iter()
            .filter(|v| v.video_id != exclude)
            .filter(|v| v.trajectory.to_line_string().intersects(&query))
            .cloned()
            .collect())
    }

    async fn ping(&mut self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Convenience for tests: a video record built straight from samples.
pub fn video_from_samples(
    video_id: &str,
    keywords: Option<&str>,
    samples: &[Sample],
) -> Result<VideoRecord, CoreError> {
    let first = samples.first().ok_or(CoreError::DegenerateGeometry { samples: 0 })?;
    Ok(VideoRecord {
        video_id: video_id.to_string(),
        keywords: keywords.map(str::to_string),
        location: build_location(first.lat, first.lng),
        trajectory: crate::geometry::build_trajectory(samples)?,
    })
}
