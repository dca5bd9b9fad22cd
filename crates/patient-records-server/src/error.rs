//! HTTP error responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use patient_records_core::{ErrorKind, FieldIssue, RecordError};
use patient_records_predict::PredictError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler can fail with.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Invalid query: {0}")]
    Query(#[from] QueryRejection),

    /// A blocking registry task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Task(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Record(e) => e.kind(),
            ApiError::Predict(PredictError::Validation(_) | PredictError::Json(_)) => {
                ErrorKind::Validation
            }
            ApiError::Predict(PredictError::Model(_)) => ErrorKind::Internal,
            ApiError::Body(_) | ApiError::Query(_) => ErrorKind::InvalidArgument,
            ApiError::Task(_) => ErrorKind::Internal,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Conflict | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Storage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn issues(&self) -> Option<Vec<FieldIssue>> {
        let issues: &[FieldIssue] = match self {
            ApiError::Record(e) => e.issues(),
            ApiError::Predict(PredictError::Validation(e)) => e.issues.as_slice(),
            _ => return None,
        };
        (!issues.is_empty()).then(|| issues.to_vec())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let rule = match err {
            ApiError::Record(e) => e.rule(),
            _ => None,
        };
        Self {
            error: err.to_string(),
            kind: err.kind(),
            code: err.status_code().as_u16(),
            rule,
            issues: err.issues(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!(kind = self.kind().as_str(), "request rejected: {self}");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
