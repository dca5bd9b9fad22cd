//! Error taxonomy shared by every registry operation.

use serde::Serialize;
use thiserror::Error;

use crate::schema::{BusinessRuleError, FieldIssue, ValidationError};
use crate::store::StoreError;

/// Which kind of failure occurred, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BusinessRule,
    Conflict,
    NotFound,
    InvalidArgument,
    Unauthorized,
    Storage,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::BusinessRule => "business_rule",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors surfaced by the registry and the record pipeline.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    BusinessRule(#[from] BusinessRuleError),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// Login failed. Deliberately does not say whether the email exists.
    #[error("Invalid email or password")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RecordResult<T> = Result<T, RecordError>;

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::Validation(_) => ErrorKind::Validation,
            RecordError::BusinessRule(_) => ErrorKind::BusinessRule,
            RecordError::Conflict(_) => ErrorKind::Conflict,
            RecordError::NotFound(_) => ErrorKind::NotFound,
            RecordError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RecordError::Unauthorized => ErrorKind::Unauthorized,
            RecordError::Storage(_) => ErrorKind::Storage,
            RecordError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Field-level detail for validation failures; empty for every other kind.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            RecordError::Validation(e) => &e.issues,
            _ => &[],
        }
    }

    /// Name of the violated rule, if this is a business rule failure.
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            RecordError::BusinessRule(e) => Some(e.rule),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        RecordError::Internal(format!("JSON serialization error: {}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for RecordError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RecordError::Storage(StoreError::Poisoned(e.to_string()))
    }
}
