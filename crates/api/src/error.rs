use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use geovid_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ "error": message }` bodies;
/// store failures are reported generically and logged once here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `geovid_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every store-side failure.
pub const DATABASE_ERROR: &str = "Database error";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::info!(entity, id = %id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        format!("{entity} with id {id} not found"),
                    )
                }
                CoreError::Validation(msg) => {
                    tracing::info!(error = %msg, "Rejected request");
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                CoreError::Connection(_)
                | CoreError::Query(_)
                | CoreError::DegenerateGeometry { .. }
                | CoreError::InvalidGeometry(_) => {
                    tracing::error!(error = %core, "Store request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, DATABASE_ERROR.to_string())
                }
            },

            AppError::BadRequest(msg) => {
                tracing::info!(error = %msg, "Rejected request");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        let body = json!({ "error": message });

        (status, axum::Json(body)).into_response()
    }
}
