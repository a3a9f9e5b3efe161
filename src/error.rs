use std::fmt::Display;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {raw}")]
pub struct UnknownEnumValue {
    pub kind: &'static str,
    pub raw: String,
}

impl UnknownEnumValue {
    pub fn new(kind: &'static str, raw: impl Display) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode tags: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,

    #[error("persistence call timed out after {0:?}")]
    Timeout(Duration),

    #[error("insert cancelled before commit")]
    Cancelled,

    #[error("persistence task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("store returned an unexpected {field}: {value}")]
    UnexpectedGenerated { field: &'static str, value: i64 },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to create feedback")]
    Persistence(#[from] PersistenceFailure),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MalformedPayload(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(failure) => {
                error!("Failed to insert feedback: {failure}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to open database: {0}")]
    Persistence(#[from] PersistenceFailure),

    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}
