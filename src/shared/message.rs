/**
 * Message Data Structure
 *
 * This module defines the row type of the `messages` table and the payload
 * used to create new rows.
 *
 * The same types travel over the REST endpoints, inside change events and
 * through the client-side timeline, so they are shared between the backend
 * and the chat panel.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::session::UserIdentity;

/// A single row of the `messages` table
///
/// `id` and `created_at` are assigned by the backend when the row is
/// inserted and never change afterwards. Author metadata (`user_name`,
/// `user_email`, `avatar_url`) is captured at send time and is not re-synced
/// when the author's profile changes.
///
/// # Example
/// ```rust
/// use classchat::shared::Message;
///
/// let json = r#"{
///     "id": "1",
///     "user_id": "user_1",
///     "user_name": "Asha",
///     "content": "Hello",
///     "created_at": "2024-01-01T09:00:00Z"
/// }"#;
/// let message: Message = serde_json::from_str(json).unwrap();
/// assert_eq!(message.user_email, None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Backend-assigned unique identifier
    pub id: String,
    /// Identifier of the author
    pub user_id: String,
    /// Author display name at send time
    pub user_name: String,
    /// Author email at send time
    #[serde(default)]
    pub user_email: Option<String>,
    /// Author avatar at send time
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Mutable text body
    pub content: String,
    /// Creation timestamp, the only ordering key
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether this message was written by the given user
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Insert payload for a new message
///
/// Everything except `id` and `created_at`, which the backend fills in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewMessage {
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub content: String,
}

impl NewMessage {
    /// Build an insert payload, snapshotting author metadata from `author`
    ///
    /// The content is stored as given; callers trim it before calling.
    pub fn from_identity(author: &UserIdentity, content: impl Into<String>) -> Self {
        Self {
            user_id: author.id.clone(),
            user_name: author.display_name(),
            user_email: author.primary_email.clone(),
            avatar_url: author.avatar_url.clone(),
            content: content.into(),
        }
    }

    /// Reject payloads the backend would never store
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.user_id.trim().is_empty() {
            return Err(SharedError::validation("user_id", "Author id cannot be empty"));
        }
        if self.content.trim().is_empty() {
            return Err(SharedError::validation("content", "Message content cannot be empty"));
        }
        Ok(())
    }

    /// Turn the payload into a stored row
    pub fn into_message(self, id: String, created_at: DateTime<Utc>) -> Message {
        Message {
            id,
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email,
            avatar_url: self.avatar_url,
            content: self.content,
            created_at,
        }
    }
}

/// Body of a content-only update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentPatch {
    pub content: String,
}
