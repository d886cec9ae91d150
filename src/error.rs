use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced across the library boundary.
///
/// Probe and revive failures are absorbed internally by the scheduler and never
/// constructed as this type; they exist here only as the vocabulary other modules
/// use to describe what happened in logs.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("malformed config record at line {line}: {source}")]
    ConfigParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config record: {0}")]
    ConfigWrite(#[source] std::io::Error),

    #[error("failed to bind control server: {0}")]
    Bind(#[source] std::io::Error),

    #[error("invalid parameter: {0}")]
    Validation(String),

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("failed to spawn revival command: {0}")]
    ReviveSpawn(#[source] std::io::Error),

    #[error("no monitor found in discovery port range")]
    Discovery,
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match &self {
            MonitorError::Validation(_) => StatusCode::BAD_REQUEST,
            MonitorError::ConfigWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::Bind(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::ConfigParse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::Probe(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::ReviveSpawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::Discovery => StatusCode::NOT_FOUND,
        };
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
