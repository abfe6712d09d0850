#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geovid_core::error::CoreError;
use geovid_core::geometry::Trajectory;
use geovid_core::memory::{MemoryGeoStore, MemorySampleSource};
use geovid_core::store::{
    GeoField, GeoStore, GeoStoreConnector, SampleSource, SampleSourceConnector,
};
use geovid_core::types::{Sample, SourceRow, VideoHeader, VideoRecord};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn sample(lat: f64, lng: f64, time_code: f64) -> Sample {
    Sample {
        lat,
        lng,
        time_code,
        theta_x: 0.5,
        theta_y: 1.5,
        theta_z: 2.5,
        r: 100.0,
        alpha: 60.0,
    }
}

pub fn rows(video_id: &str, samples: &[(f64, f64, f64)]) -> Vec<SourceRow> {
    samples
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng, t))| SourceRow {
            video_id: video_id.to_string(),
            fov_num: i as i64 + 1,
            keywords: Some(format!("{video_id} keywords")),
            sample: sample(lat, lng, t),
        })
        .collect()
}

/// V1 crosses longitude 20–21 / latitude 10–11, V3 crosses it the other way,
/// V4 lies elsewhere, and V2 never moves.
pub fn scenario_rows() -> Vec<SourceRow> {
    let mut all = Vec::new();
    all.extend(rows("V1", &[(10.0, 20.0, 0.0), (10.0, 20.0, 5.0), (11.0, 21.0, 10.0)]));
    all.extend(rows("V2", &[(5.0, 5.0, 0.0), (5.0, 5.0, 1.0), (5.0, 5.0, 2.0)]));
    all.extend(rows("V3", &[(11.0, 20.0, 0.0), (10.0, 21.0, 10.0)]));
    all.extend(rows("V4", &[(50.0, 50.0, 0.0), (51.0, 51.0, 1.0)]));
    all
}

pub fn ids(videos: &[VideoRecord]) -> Vec<String> {
    let mut ids: Vec<String> = videos.iter().map(|v| v.video_id.clone()).collect();
    ids.sort();
    ids
}

// ---------------------------------------------------------------------------
// Connection tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Wraps a geo-store connector, counting sessions and optionally failing
/// bulk inserts.
pub struct TrackedGeo {
    pub inner: MemoryGeoStore,
    pub counters: Arc<Counters>,
    pub fail_insert: bool,
}

impl TrackedGeo {
    pub fn new(inner: MemoryGeoStore) -> Self {
        Self {
            inner,
            counters: Arc::default(),
            fail_insert: false,
        }
    }
}

#[async_trait]
impl GeoStoreConnector for TrackedGeo {
    async fn connect(&self) -> Result<Box<dyn GeoStore>, CoreError> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedGeoSession {
            inner: self.inner.connect().await?,
            counters: Arc::clone(&self.counters),
            fail_insert: self.fail_insert,
        }))
    }
}

struct TrackedGeoSession {
    inner: Box<dyn GeoStore>,
    counters: Arc<Counters>,
    fail_insert: bool,
}

#[async_trait]
impl GeoStore for TrackedGeoSession {
    async fn clear(&mut self) -> Result<u64, CoreError> {
        self.inner.clear().await
    }

    async fn insert_many(&mut self, videos: &[VideoRecord]) -> Result<u64, CoreError> {
        if self.fail_insert {
            return Err(CoreError::Query("insert rejected".into()));
        }
        self.inner.insert_many(videos).await
    }

    async fn create_spatial_index(&mut self, field: GeoField) -> Result<(), CoreError> {
        self.inner.create_spatial_index(field).await
    }

    async fn find_trajectory(&mut self, video_id: &str) -> Result<Option<Trajectory>, CoreError> {
        self.inner.find_trajectory(video_id).await
    }

    async fn find_intersecting(
        &mut self,
        exclude: &str,
        geometry: &Trajectory,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        self.inner.find_intersecting(exclude, geometry).await
    }

    async fn ping(&mut self) -> Result<(), CoreError> {
        self.inner.ping().await
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }
}

/// Wraps the in-memory source. Can skip the distinct-position filter, fail
/// to connect, and records the peak number of concurrent sample loads.
#[derive(Clone)]
pub struct TrackedSource {
    pub inner: MemorySampleSource,
    pub counters: Arc<Counters>,
    pub unfiltered: bool,
    pub refuse_connection: bool,
    pub load_delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    pub peak_in_flight: Arc<AtomicUsize>,
}

impl TrackedSource {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self {
            inner: MemorySampleSource::new(rows),
            counters: Arc::default(),
            unfiltered: false,
            refuse_connection: false,
            load_delay: None,
            in_flight: Arc::default(),
            peak_in_flight: Arc::default(),
        }
    }
}

#[async_trait]
impl SampleSourceConnector for TrackedSource {
    async fn connect(&self) -> Result<Box<dyn SampleSource>, CoreError> {
        if self.refuse_connection {
            return Err(CoreError::Connection("connection refused".into()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl SampleSource for TrackedSource {
    async fn select_candidates(&self) -> Result<Vec<VideoHeader>, CoreError> {
        if !self.unfiltered {
            return self.inner.select_candidates().await;
        }
        // Every first frame, stationary or not.
        let mut headers = Vec::new();
        for video_id in ["V1", "V2", "V3", "V4"] {
            if let Some(first) = self.inner.load_samples(video_id).await?.first() {
                headers.push(VideoHeader {
                    video_id: video_id.to_string(),
                    lat: first.lat,
                    lng: first.lng,
                    keywords: None,
                });
            }
        }
        Ok(headers)
    }

    async fn load_samples(&self, video_id: &str) -> Result<Vec<Sample>, CoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        let samples = self.inner.load_samples(video_id).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        samples
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
