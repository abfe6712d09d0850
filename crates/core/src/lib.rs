//! Domain types and logic for video trajectory ingestion and intersection
//! queries: geometry construction, candidate selection, and the store
//! contracts the pipeline runs against.

pub mod error;
pub mod geometry;
pub mod memory;
pub mod selection;
pub mod store;
pub mod types;
