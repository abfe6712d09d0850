//! MySQL implementation of the relational sample source.
//!
//! Reads the per-frame `VIDEO_METADATA`-style table. One pool is opened per
//! ingestion run, sized to the sample-load fan-out, and closed at its end.

use async_trait::async_trait;
use geovid_core::error::CoreError;
use geovid_core::store::{SampleSource, SampleSourceConnector};
use geovid_core::types::{Sample, VideoHeader};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;

use crate::config::{validate_identifier, StoreConfig};
use crate::error::{connection_error, query_error};

/// Opens [`MySqlSampleSource`] sessions.
#[derive(Debug, Clone)]
pub struct MySqlSampleConnector {
    url: String,
    table: String,
    max_connections: u32,
}

impl MySqlSampleConnector {
    pub fn new(config: &StoreConfig) -> Result<Self, CoreError> {
        validate_identifier(&config.source_table)?;
        Ok(Self {
            url: config.source_url.clone(),
            table: config.source_table.clone(),
            max_connections: u32::try_from(config.ingest_concurrency.max(1)).unwrap_or(u32::MAX),
        })
    }
}

#[async_trait]
impl SampleSourceConnector for MySqlSampleConnector {
    async fn connect(&self) -> Result<Box<dyn SampleSource>, CoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await
            .map_err(connection_error)?;
        tracing::debug!(table = %self.table, "Sample source connected");

        Ok(Box::new(MySqlSampleSource {
            pool,
            table: self.table.clone(),
        }))
    }
}

/// A session on the sample table.
pub struct MySqlSampleSource {
    pool: MySqlPool,
    table: String,
}

/// First-frame row of a candidate video.
#[derive(Debug, FromRow)]
struct HeaderRow {
    #[sqlx(rename = "VideoId")]
    video_id: String,
    #[sqlx(rename = "Plat")]
    lat: f64,
    #[sqlx(rename = "Plng")]
    lng: f64,
    #[sqlx(rename = "Keywords")]
    keywords: Option<String>,
}

/// One sample row. `TimeCode` arrives as text so any numeric column type
/// can be truncated the same way.
#[derive(Debug, FromRow)]
struct SampleRow {
    #[sqlx(rename = "Plat")]
    lat: f64,
    #[sqlx(rename = "Plng")]
    lng: f64,
    #[sqlx(rename = "TimeCode")]
    time_code: String,
    #[sqlx(rename = "ThetaX")]
    theta_x: f64,
    #[sqlx(rename = "ThetaY")]
    theta_y: f64,
    #[sqlx(rename = "ThetaZ")]
    theta_z: f64,
    #[sqlx(rename = "R")]
    r: f64,
    #[sqlx(rename = "Alpha")]
    alpha: f64,
}

impl SampleRow {
    fn into_sample(self, video_id: &str) -> Result<Sample, CoreError> {
        Ok(Sample {
            lat: self.lat,
            lng: self.lng,
            time_code: parse_time_code(&self.time_code, video_id)?,
            theta_x: self.theta_x,
            theta_y: self.theta_y,
            theta_z: self.theta_z,
            r: self.r,
            alpha: self.alpha,
        })
    }
}

/// First frame of every video that has another frame at a different position.
fn candidates_sql(table: &str) -> String {
    format!(
        "SELECT t1.VideoId, t1.Plat, t1.Plng, t1.Keywords
         FROM {table} AS t1
         WHERE t1.FovNum = 1 AND EXISTS (
             SELECT 1 FROM {table} AS t2
             WHERE t2.VideoId = t1.VideoId
               AND (t2.Plat <> t1.Plat OR t2.Plng <> t1.Plng))"
    )
}

/// All frames of one video. Ordering uses the qualified column so the text
/// alias of `TimeCode` does not turn it into a lexicographic sort.
fn samples_sql(table: &str) -> String {
    format!(
        "SELECT t.Plat, t.Plng, CAST(t.TimeCode AS CHAR) AS TimeCode,
                t.ThetaX, t.ThetaY, t.ThetaZ, t.R, t.Alpha
         FROM {table} AS t
         WHERE t.VideoId = ?
         ORDER BY t.TimeCode ASC"
    )
}

fn parse_time_code(raw: &str, video_id: &str) -> Result<f64, CoreError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| {
            CoreError::Query(format!("invalid TimeCode '{raw}' for video {video_id}"))
        })
}

#[async_trait]
impl SampleSource for MySqlSampleSource {
    async fn select_candidates(&self) -> Result<Vec<VideoHeader>, CoreError> {
        let rows = sqlx::query_as::<_, HeaderRow>(&candidates_sql(&self.table))
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .map(|row| VideoHeader {
                video_id: row.video_id,
                lat: row.lat,
                lng: row.lng,
                keywords: row.keywords,
            })
            .collect())
    }

    async fn load_samples(&self, video_id: &str) -> Result<Vec<Sample>, CoreError> {
        let rows = sqlx::query_as::<_, SampleRow>(&samples_sql(&self.table))
            .bind(video_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.into_iter()
            .map(|row| row.into_sample(video_id))
            .collect()
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.pool.close().await;
        tracing::debug!("Sample source closed");
        Ok(())
    }
}
