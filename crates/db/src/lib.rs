//! Database adapters: the MySQL sample source and the PostGIS geo-store.

pub mod config;
pub mod error;
pub mod geo_store;
pub mod source;

pub use config::StoreConfig;
pub use geo_store::{PgGeoStore, PgGeoStoreConnector};
pub use source::{MySqlSampleConnector, MySqlSampleSource};
