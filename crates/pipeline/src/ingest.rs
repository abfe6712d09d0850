//! Full-corpus ingestion: relational samples → trajectories → geo-store.
//!
//! Stages run strictly in order and the first failure aborts the run:
//!
//! ```text
//! connect → clear → select candidates → load trajectories (fan-out)
//!         → bulk insert → index trajectory → index location → disconnect
//! ```
//!
//! Every trajectory is built before anything is inserted, so a failing video
//! leaves the corpus cleared rather than partially written.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use geovid_core::error::CoreError;
use geovid_core::geometry::{build_location, build_trajectory};
use geovid_core::store::{
    GeoField, GeoStore, GeoStoreConnector, SampleSource, SampleSourceConnector,
};
use geovid_core::types::{VideoHeader, VideoRecord};

/// Ingestion stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Connect,
    Clear,
    SelectCandidates,
    LoadTrajectories,
    BulkInsert,
    IndexTrajectory,
    IndexLocation,
    Disconnect,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Clear => "clear",
            Self::SelectCandidates => "select_candidates",
            Self::LoadTrajectories => "load_trajectories",
            Self::BulkInsert => "bulk_insert",
            Self::IndexTrajectory => "index_trajectory",
            Self::IndexLocation => "index_location",
            Self::Disconnect => "disconnect",
        }
    }
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed ingestion run and the stage it failed in.
#[derive(Debug, thiserror::Error)]
#[error("Ingestion failed at stage {stage}: {source}")]
pub struct IngestError {
    pub stage: IngestStage,
    #[source]
    pub source: CoreError,
}

fn at(stage: IngestStage) -> impl FnOnce(CoreError) -> IngestError {
    move |source| IngestError { stage, source }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents removed by the clear stage.
    pub removed: u64,
    /// Videos that passed candidate selection.
    pub candidates: usize,
    /// Documents written by the bulk insert.
    pub inserted: u64,
}

/// Rebuilds the geo-store corpus from the relational source.
pub struct IngestionPipeline {
    geo: Arc<dyn GeoStoreConnector>,
    source: Arc<dyn SampleSourceConnector>,
    concurrency: usize,
}

impl IngestionPipeline {
    /// `concurrency` bounds the per-video sample loads; `0` is treated as `1`.
    pub fn new(
        geo: Arc<dyn GeoStoreConnector>,
        source: Arc<dyn SampleSourceConnector>,
        concurrency: usize,
    ) -> Self {
        Self {
            geo,
            source,
            concurrency: concurrency.max(1),
        }
    }

    /// Run one full ingestion.
    ///
    /// Both connections are closed before returning, whether the run
    /// succeeded or not.
    pub async fn run(&self) -> Result<IngestReport, IngestError> {
        let started = Instant::now();

        tracing::info!(stage = %IngestStage::Connect, "Connecting to geo-store");
        let mut geo = self.geo.connect().await.map_err(at(IngestStage::Connect))?;

        tracing::info!(stage = %IngestStage::Connect, "Connecting to sample source");
        let source = match self.source.connect().await {
            Ok(source) => source,
            Err(err) => {
                if let Err(close_err) = geo.close().await {
                    tracing::warn!(error = %close_err, "Failed to close geo-store");
                }
                return Err(IngestError {
                    stage: IngestStage::Connect,
                    source: err,
                });
            }
        };

        let result = self.run_stages(geo.as_mut(), source.as_ref()).await;

        tracing::info!(stage = %IngestStage::Disconnect, "Closing connections");
        let source_closed = source.close().await;
        let geo_closed = geo.close().await;

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                for closed in [source_closed, geo_closed] {
                    if let Err(close_err) = closed {
                        tracing::warn!(error = %close_err, "Failed to close connection");
                    }
                }
                return Err(err);
            }
        };
        source_closed
            .and(geo_closed)
            .map_err(at(IngestStage::Disconnect))?;

        tracing::info!(
            removed = report.removed,
            candidates = report.candidates,
            inserted = report.inserted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ingestion complete"
        );
        Ok(report)
    }

    async fn run_stages(
        &self,
        geo: &mut dyn GeoStore,
        source: &dyn SampleSource,
    ) -> Result<IngestReport, IngestError> {
        tracing::info!(stage = %IngestStage::Clear, "Dropping existing videos");
        let removed = geo.clear().await.map_err(at(IngestStage::Clear))?;

        tracing::info!(stage = %IngestStage::SelectCandidates, "Selecting candidate videos");
        let headers = source
            .select_candidates()
            .await
            .map_err(at(IngestStage::SelectCandidates))?;
        let candidates = headers.len();
        tracing::info!(candidates, "Candidate videos selected");

        tracing::info!(
            stage = %IngestStage::LoadTrajectories,
            concurrency = self.concurrency,
            "Loading trajectories"
        );
        let videos = self
            .load_videos(source, headers)
            .await
            .map_err(at(IngestStage::LoadTrajectories))?;

        let inserted = if videos.is_empty() {
            tracing::warn!(stage = %IngestStage::BulkInsert, "No eligible videos, skipping insert");
            0
        } else {
            tracing::info!(stage = %IngestStage::BulkInsert, count = videos.len(), "Inserting videos");
            geo.insert_many(&videos)
                .await
                .map_err(at(IngestStage::BulkInsert))?
        };

        tracing::info!(stage = %IngestStage::IndexTrajectory, "Creating geo index for trajectory");
        geo.create_spatial_index(GeoField::Trajectory)
            .await
            .map_err(at(IngestStage::IndexTrajectory))?;

        tracing::info!(stage = %IngestStage::IndexLocation, "Creating geo index for location");
        geo.create_spatial_index(GeoField::Location)
            .await
            .map_err(at(IngestStage::IndexLocation))?;

        Ok(IngestReport {
            removed,
            candidates,
            inserted,
        })
    }

    /// Load and build every candidate with bounded concurrency.
    ///
    /// Completion order across videos is irrelevant; the first error drops
    /// the remaining in-flight loads.
    async fn load_videos(
        &self,
        source: &dyn SampleSource,
        headers: Vec<VideoHeader>,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        stream::iter(headers)
            .map(|header| load_video(source, header))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}

async fn load_video(source: &dyn SampleSource, header: VideoHeader) -> Result<VideoRecord, CoreError> {
    let samples = source.load_samples(&header.video_id).await?;

    let trajectory = build_trajectory(&samples).inspect_err(|err| {
        tracing::error!(video_id = %header.video_id, error = %err, "Failed to build trajectory");
    })?;
    tracing::debug!(video_id = %header.video_id, vertices = trajectory.len(), "Trajectory built");

    Ok(VideoRecord {
        location: build_location(header.lat, header.lng),
        trajectory,
        video_id: header.video_id,
        keywords: header.keywords,
    })
}
