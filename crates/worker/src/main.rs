use std::process::ExitCode;
use std::sync::Arc;

use geovid_db::{MySqlSampleConnector, PgGeoStoreConnector, StoreConfig};
use geovid_pipeline::IngestionPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rebuild the geo-store corpus from the relational source, once.
///
/// Exits with status 1 after logging a single error line if any stage fails.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "geovid_worker=debug,geovid_pipeline=debug,geovid_db=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env();
    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "Invalid store configuration");
        return ExitCode::FAILURE;
    }

    let (geo, source) = match (
        PgGeoStoreConnector::new(&config),
        MySqlSampleConnector::new(&config),
    ) {
        (Ok(geo), Ok(source)) => (geo, source),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(error = %err, "Invalid store configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = geo.ensure_collection().await {
        tracing::error!(error = %err, collection = %config.collection, "Failed to prepare geo-store collection");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        source_table = %config.source_table,
        collection = %config.collection,
        concurrency = config.ingest_concurrency,
        "Starting ingestion"
    );

    let pipeline = IngestionPipeline::new(
        Arc::new(geo),
        Arc::new(source),
        config.ingest_concurrency,
    );

    match pipeline.run().await {
        Ok(report) => {
            tracing::info!(
                removed = report.removed,
                candidates = report.candidates,
                inserted = report.inserted,
                "Ingestion complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(stage = %err.stage, error = %err.source, "Ingestion failed");
            ExitCode::FAILURE
        }
    }
}
