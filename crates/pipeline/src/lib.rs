//! Ingestion and query pipelines over the store contracts in `geovid-core`.

pub mod ingest;
pub mod intersect;

pub use ingest::{IngestError, IngestReport, IngestStage, IngestionPipeline};
pub use intersect::IntersectionService;
