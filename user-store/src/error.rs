//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error (binding the listener, serving connections)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (malformed request body)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// The 404 raised when no user carries the requested id
    pub fn user_not_found() -> Self {
        Error::NotFound("User not found".to_string())
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
///
/// Not-found responses carry only `message`, matching the public contract
/// `{"message": "User not found"}`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub message: String,

    /// Optional machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create error response with a code
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Error::NotFound(msg) => ErrorResponse::new(msg),

            Error::BadRequest(msg) => ErrorResponse::with_code("BAD_REQUEST", msg),

            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                ErrorResponse::with_code("CONFIG_ERROR", "Service misconfigured")
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                ErrorResponse::with_code("IO_ERROR", "I/O operation failed")
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse::with_code("INTERNAL_ERROR", "Internal server error")
            }
        };

        (status, Json(body)).into_response()
    }
}

// Manual From implementation for the boxed variant
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::BadRequest(format!("Invalid JSON body: {}", err))
    }
}
