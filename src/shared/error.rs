//! Errors raised by the shared message types
//!
//! Both the chat panel and the server validate message payloads with the
//! same rules, so the failures live here and each side wraps them in its
//! own error type.
//!
//! ```rust
//! use classchat::shared::{NewMessage, SharedError, UserIdentity};
//!
//! let blank = NewMessage::from_identity(&UserIdentity::new("u1"), "   ");
//! assert!(matches!(blank.validate(), Err(SharedError::ValidationError { .. })));
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// A message or change event could not be encoded or decoded
    #[error("Could not (de)serialize payload: {message}")]
    SerializationError { message: String },

    /// A payload field breaks the row rules
    #[error("Invalid {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
