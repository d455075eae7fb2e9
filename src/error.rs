//! Error types for the relay
//!
//! Client input errors carry a `detail` body, everything else is reported as
//! a 500 with an `error` body holding the error's message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// The request parsed but is not something we can run
    #[error("{0}")]
    Validation(String),

    /// The request body is not a valid chat request
    #[error("{0}")]
    InvalidBody(String),

    /// The agent runtime rejected or failed the run
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::Upstream(_) => "upstream",
            AppError::Http(_) => "http",
            AppError::Serialization(_) => "serialization",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream(_)
            | AppError::Http(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            error!(kind = self.kind(), error = ?self, "Chat completion error");
            json!({ "error": self.to_string() })
        } else {
            json!({ "detail": self.to_string() })
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
