//! PostGIS implementation of the geo-store.
//!
//! Each video is one row. The `location` and `trajectory` JSONB columns hold
//! the GeoJSON documents returned to clients; the `*_geog` columns hold the
//! same shapes as `geography` values (two-dimensional, SRID 4326) so that
//! GiST indexes and `ST_Intersects` work on the sphere.

use async_trait::async_trait;
use geovid_core::error::CoreError;
use geovid_core::geometry::{Location, Trajectory};
use geovid_core::store::{GeoField, GeoStore, GeoStoreConnector};
use geovid_core::types::VideoRecord;
use sqlx::postgres::PgConnection;
use sqlx::{Connection, FromRow};

use crate::config::{validate_identifier, StoreConfig};
use crate::error::{connection_error, query_error};

/// Opens one dedicated [`PgGeoStore`] connection per call.
#[derive(Debug, Clone)]
pub struct PgGeoStoreConnector {
    url: String,
    collection: String,
}

impl PgGeoStoreConnector {
    pub fn new(config: &StoreConfig) -> Result<Self, CoreError> {
        validate_identifier(&config.collection)?;
        Ok(Self {
            url: config.geo_store_url.clone(),
            collection: config.collection.clone(),
        })
    }

    /// Create the PostGIS extension and the collection table if missing.
    ///
    /// Run once at process start-up, before the first ingestion or query.
    pub async fn ensure_collection(&self) -> Result<(), CoreError> {
        let mut conn = PgConnection::connect(&self.url)
            .await
            .map_err(connection_error)?;

        let result = create_collection(&mut conn, &self.collection).await;
        let closed = conn.close().await.map_err(query_error);
        result?;
        closed
    }
}

async fn create_collection(conn: &mut PgConnection, collection: &str) -> Result<(), CoreError> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS postgis")
        .execute(&mut *conn)
        .await
        .map_err(query_error)?;

    sqlx::query(&create_table_sql(collection))
        .execute(&mut *conn)
        .await
        .map_err(query_error)?;

    tracing::info!(collection, "Geo-store collection ready");
    Ok(())
}

#[async_trait]
impl GeoStoreConnector for PgGeoStoreConnector {
    async fn connect(&self) -> Result<Box<dyn GeoStore>, CoreError> {
        let conn = PgConnection::connect(&self.url)
            .await
            .map_err(connection_error)?;
        tracing::debug!(collection = %self.collection, "Geo-store connected");

        Ok(Box::new(PgGeoStore {
            conn,
            collection: self.collection.clone(),
        }))
    }
}

/// A single connection to the geo-store.
pub struct PgGeoStore {
    conn: PgConnection,
    collection: String,
}

/// A full video document as read back from the table.
#[derive(Debug, FromRow)]
struct VideoRow {
    video_id: String,
    keywords: Option<String>,
    location: serde_json::Value,
    trajectory: serde_json::Value,
}

impl VideoRow {
    fn into_record(self) -> Result<VideoRecord, CoreError> {
        Ok(VideoRecord {
            location: decode_geometry::<Location>(self.location, &self.video_id)?,
            trajectory: decode_geometry::<Trajectory>(self.trajectory, &self.video_id)?,
            video_id: self.video_id,
            keywords: self.keywords,
        })
    }
}

fn decode_geometry<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    video_id: &str,
) -> Result<T, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::InvalidGeometry(format!("video {video_id}: {e}")))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string(value).map_err(|e| CoreError::InvalidGeometry(e.to_string()))
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

fn create_table_sql(collection: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {collection} (
             video_id        TEXT PRIMARY KEY,
             keywords        TEXT,
             location        JSONB NOT NULL,
             trajectory      JSONB NOT NULL,
             location_geog   geography(Point, 4326) NOT NULL,
             trajectory_geog geography(LineString, 4326) NOT NULL
         )"
    )
}

/// Batch insert from parallel arrays in a single statement.
fn insert_sql(collection: &str) -> String {
    format!(
        "INSERT INTO {collection}
             (video_id, keywords, location, trajectory, location_geog, trajectory_geog)
         SELECT u.video_id, u.keywords, u.location::jsonb, u.trajectory::jsonb,
                ST_SetSRID(ST_GeomFromGeoJSON(u.location_geog), 4326)::geography,
                ST_SetSRID(ST_GeomFromGeoJSON(u.trajectory_geog), 4326)::geography
         FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[])
             AS u(video_id, keywords, location, trajectory, location_geog, trajectory_geog)"
    )
}

fn index_sql(collection: &str, field: GeoField) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {collection}_{field}_gix \
         ON {collection} USING GIST ({field}_geog)"
    )
}

fn intersecting_sql(collection: &str) -> String {
    format!(
        "SELECT video_id, keywords, location, trajectory
         FROM {collection}
         WHERE video_id <> $1
           AND ST_Intersects(
                 trajectory_geog,
                 ST_SetSRID(ST_GeomFromGeoJSON($2), 4326)::geography)"
    )
}

// ---------------------------------------------------------------------------
// GeoStore
// ---------------------------------------------------------------------------

#[async_trait]
impl GeoStore for PgGeoStore {
    async fn clear(&mut self) -> Result<u64, CoreError> {
        let query = format!("DELETE FROM {}", self.collection);
        let result = sqlx::query(&query)
            .execute(&mut self.conn)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn insert_many(&mut self, videos: &[VideoRecord]) -> Result<u64, CoreError> {
        if videos.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(videos.len());
        let mut keywords = Vec::with_capacity(videos.len());
        let mut locations = Vec::with_capacity(videos.len());
        let mut trajectories = Vec::with_capacity(videos.len());
        let mut location_geogs = Vec::with_capacity(videos.len());
        let mut trajectory_geogs = Vec::with_capacity(videos.len());

        for video in videos {
            ids.push(video.video_id.clone());
            keywords.push(video.keywords.clone());
            locations.push(encode_json(&video.location)?);
            trajectories.push(encode_json(&video.trajectory)?);
            // A location is already two-dimensional.
            location_geogs.push(encode_json(&video.location)?);
            trajectory_geogs.push(encode_json(&video.trajectory.planar_geometry())?);
        }

        let result = sqlx::query(&insert_sql(&self.collection))
            .bind(ids)
            .bind(keywords)
            .bind(locations)
            .bind(trajectories)
            .bind(location_geogs)
            .bind(trajectory_geogs)
            .execute(&mut self.conn)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn create_spatial_index(&mut self, field: GeoField) -> Result<(), CoreError> {
        sqlx::query(&index_sql(&self.collection, field))
            .execute(&mut self.conn)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn find_trajectory(&mut self, video_id: &str) -> Result<Option<Trajectory>, CoreError> {
        let query = format!(
            "SELECT trajectory FROM {} WHERE video_id = $1",
            self.collection
        );
        let row: Option<(serde_json::Value,)> = sqlx::query_as(&query)
            .bind(video_id)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(query_error)?;

        row.map(|(trajectory,)| decode_geometry(trajectory, video_id))
            .transpose()
    }

    async fn find_intersecting(
        &mut self,
        exclude: &str,
        geometry: &Trajectory,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        let planar = encode_json(&geometry.planar_geometry())?;
        let rows = sqlx::query_as::<_, VideoRow>(&intersecting_sql(&self.collection))
            .bind(exclude)
            .bind(planar)
            .fetch_all(&mut self.conn)
            .await
            .map_err(query_error)?;

        rows.into_iter().map(VideoRow::into_record).collect()
    }

    async fn ping(&mut self) -> Result<(), CoreError> {
        self.conn.ping().await.map_err(query_error)
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.conn.close().await.map_err(query_error)?;
        tracing::debug!("Geo-store connection closed");
        Ok(())
    }
}
