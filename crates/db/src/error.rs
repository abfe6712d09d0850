//! Classification of sqlx errors into domain errors.

use geovid_core::error::CoreError;

/// Map a sqlx error raised while opening a connection or pool.
pub fn connection_error(err: sqlx::Error) -> CoreError {
    tracing::debug!(error = %err, "Store connection failed");
    CoreError::Connection(err.to_string())
}

/// Map a sqlx error raised by a statement.
///
/// - Transport, TLS, pool and configuration failures map to
///   [`CoreError::Connection`].
/// - Everything else (SQL errors, decode failures) maps to
///   [`CoreError::Query`].
pub fn query_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => CoreError::Connection(err.to_string()),
        other => CoreError::Query(other.to_string()),
    }
}
