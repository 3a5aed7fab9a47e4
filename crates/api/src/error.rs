//! API errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use signature_scoring::ScoringError;
use thiserror::Error;
use topology::TopologyError;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topology could not be served
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Signature table could not be served
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Request is malformed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Scope does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) | ApiError::Topology(_) | ApiError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
