#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Degenerate geometry: {samples} sample(s) without two distinct positions")]
    DegenerateGeometry { samples: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}
