//! Client Error Types
//!
//! Errors produced while talking to the message backend. The chat panel
//! never propagates these to its caller: read failures are logged and write
//! failures become user-visible alerts.

use thiserror::Error;

use crate::shared::SharedError;

/// Errors raised by a [`MessageBackend`](crate::client::backend::MessageBackend)
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Request failed with status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation requires a signed-in session
    #[error("Not signed in")]
    NotSignedIn,

    /// Backend refused the operation
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error(transparent)]
    Shared(#[from] SharedError),
}

impl ClientError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// HTTP status carried by the error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
