//! Jobserver-specific error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use shared::SharedError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobServerError {
    #[error("Document store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Scan of '{attribute}' failed: {message}")]
    ScanFailed { attribute: String, message: String },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Cache entry for '{key}' could not be encoded: {message}")]
    CacheSerialization { key: String, message: String },

    #[error("Job not found: {id}")]
    DocumentNotFound { id: String },

    #[error("{field} not found")]
    FieldNotFound { field: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("{0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl JobServerError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable { message: message.into() }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheUnavailable { message: message.into() }
    }

    /// HTTP status this error renders as
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SharedError(SharedError::InvalidDocumentId { .. }) => StatusCode::BAD_REQUEST,
            Self::DocumentNotFound { .. } | Self::FieldNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for JobServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type JobServerResult<T> = Result<T, JobServerError>;
