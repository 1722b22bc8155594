//! API error type mapping layer errors onto HTTP responses.
//!
//! Every error body is a `{"error": {...}}` envelope; oracle failures
//! additionally carry `"retryable": true` so clients know the request
//! may simply be repeated.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nursesim_core::CoreError;
use nursesim_session::{DiagnosisError, EvaluationError, SessionError};
use nursesim_store::{SaveError, StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("oracle call failed: {0}")]
    Oracle(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::EmptyUtterance => ApiError::Validation(vec!["text".to_string()]),
            SessionError::Busy => {
                ApiError::Conflict("the patient is still responding".to_string())
            }
            SessionError::NotOpened
            | SessionError::AlreadyOpen
            | SessionError::Closed
            | SessionError::NoSpeechText => ApiError::Conflict(e.to_string()),
            SessionError::Oracle(e) => ApiError::Oracle(e.to_string()),
        }
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(e: DiagnosisError) -> Self {
        match e {
            DiagnosisError::MissingDiagnosis => {
                ApiError::Validation(vec!["diagnosis".to_string()])
            }
            DiagnosisError::SubmissionInFlight | DiagnosisError::AlreadyAccepted => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(e: EvaluationError) -> Self {
        // Both arms are worth retrying: transport failures transiently,
        // malformed verdicts because the next sample may parse.
        ApiError::Oracle(e.to_string())
    }
}

impl From<SaveError> for ApiError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::Invalid(CoreError::InvalidCase(fields)) => ApiError::Validation(fields),
            SaveError::Store(e) => ApiError::Storage(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": { "message": self.to_string(), "fields": fields } }),
            ),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": { "message": self.to_string() } }),
            ),
            ApiError::Conflict(_) => (
                StatusCode::CONFLICT,
                json!({ "error": { "message": self.to_string() } }),
            ),
            ApiError::Oracle(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": { "message": self.to_string(), "retryable": true } }),
            ),
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": { "message": self.to_string() } }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
