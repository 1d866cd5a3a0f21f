/**
 * Backend Error Types
 *
 * Every failure a request handler or middleware can run into:
 *
 * - `HandlerError` - request-level failures carrying their own status
 *   (bad input, missing row, not the author)
 * - `AuthError` - missing or invalid credentials (401)
 * - `StateError` - server state that cannot be used (500)
 * - `DatabaseError` - Postgres failures from `sqlx` (500)
 * - `SharedError` / `SerializationError` - wrapped lower-level errors
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        status: StatusCode,
        message: String,
    },

    /// Missing or rejected credentials
    #[error("Authentication error: {message}")]
    AuthError { message: String },

    /// Server state error
    #[error("State error: {message}")]
    StateError { message: String },

    /// Persistence error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client
    ///
    /// Database details stay in the server log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::AuthError { message } => message.clone(),
            Self::StateError { message } => message.clone(),
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
