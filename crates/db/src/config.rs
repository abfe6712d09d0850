use geovid_core::error::CoreError;

/// Connection and naming settings for the two stores.
///
/// Passed explicitly into the store connectors; nothing reads these values
/// from process-wide state after start-up.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// MySQL URL of the relational sample source.
    pub source_url: String,
    /// PostgreSQL/PostGIS URL of the geo-store.
    pub geo_store_url: String,
    /// Name of the per-frame sample table in the source.
    pub source_table: String,
    /// Name of the geo-store table holding video documents.
    pub collection: String,
    /// Maximum number of videos whose samples load concurrently.
    pub ingest_concurrency: usize,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default          |
    /// |-----------------------|------------------|
    /// | `SOURCE_DATABASE_URL` | (required)       |
    /// | `GEO_STORE_URL`       | (required)       |
    /// | `SOURCE_TABLE`        | `VIDEO_METADATA` |
    /// | `GEO_COLLECTION`      | `videos`         |
    /// | `INGEST_CONCURRENCY`  | `8`              |
    pub fn from_env() -> Self {
        let source_url =
            std::env::var("SOURCE_DATABASE_URL").expect("SOURCE_DATABASE_URL must be set");
        let geo_store_url = std::env::var("GEO_STORE_URL").expect("GEO_STORE_URL must be set");

        let source_table =
            std::env::var("SOURCE_TABLE").unwrap_or_else(|_| "VIDEO_METADATA".into());
        let collection = std::env::var("GEO_COLLECTION").unwrap_or_else(|_| "videos".into());

        let ingest_concurrency: usize = std::env::var("INGEST_CONCURRENCY")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("INGEST_CONCURRENCY must be a valid usize");

        Self {
            source_url,
            geo_store_url,
            source_table,
            collection,
            ingest_concurrency,
        }
    }

    /// Check the values that end up inside SQL text or pool sizes.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_identifier(&self.source_table)?;
        validate_identifier(&self.collection)?;
        if self.ingest_concurrency == 0 {
            return Err(CoreError::Validation(
                "ingest_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Maximum identifier length accepted by PostgreSQL.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Table names are interpolated into SQL, so only plain identifiers pass:
/// ASCII letters, digits and underscores, not starting with a digit.
pub fn validate_identifier(name: &str) -> Result<(), CoreError> {
    let valid_start = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::Validation(format!(
            "'{name}' is not a valid table name"
        )));
    }
    Ok(())
}
