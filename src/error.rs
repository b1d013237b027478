use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors the prediction core surfaces to callers. Model absence is not an
/// error: the engine switches to heuristic mode instead.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Caller input is malformed or out of range; the request is rejected
    /// with field-level detail and no partial result.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Normalization produced a non-finite vector. Internal bug, not caller error.
    #[error("non-finite feature vector: {0}")]
    InvalidFeature(String),
}

impl PredictError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PredictError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        match &self {
            PredictError::Validation { field, reason } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": reason, "field": field })),
            )
                .into_response(),
            PredictError::InvalidFeature(detail) => {
                tracing::error!("rejecting request on non-finite features: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
