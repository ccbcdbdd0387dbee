use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Per-request failures. Startup failures go through anyhow in main and are
/// fatal; nothing here retries.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    BadInput(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            PredictError::BadInput(_) => StatusCode::BAD_REQUEST,
            PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
