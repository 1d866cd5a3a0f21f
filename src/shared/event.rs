/**
 * Row Change Events
 *
 * This module defines the events pushed over the change subscription of the
 * `messages` table. Each event names its kind and carries the new row
 * (insert/update) and/or the key of the old row (update/delete).
 *
 * Wire format:
 *
 * ```json
 * {
 *   "eventType": "DELETE",
 *   "table": "messages",
 *   "commit_timestamp": "2024-01-01T09:00:00Z",
 *   "new": null,
 *   "old": { "id": "1" }
 * }
 * ```
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::message::Message;

/// Name of the table the chat subscribes to
pub const MESSAGES_TABLE: &str = "messages";

/// Kind of row change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete];

    /// Upper-case name, also used as the SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }

    /// Parse a kind name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "INSERT" => Some(ChangeKind::Insert),
            "UPDATE" => Some(ChangeKind::Update),
            "DELETE" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

/// Primary key of a row as carried in `old`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowKey {
    pub id: String,
}

/// A row-level change notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    /// Table the change happened on
    #[serde(default = "default_table")]
    pub table: String,
    /// When the backend committed the change
    pub commit_timestamp: DateTime<Utc>,
    /// Row after the change (insert/update)
    #[serde(default)]
    pub new: Option<Message>,
    /// Key of the row before the change (update/delete)
    #[serde(default)]
    pub old: Option<RowKey>,
}

fn default_table() -> String {
    MESSAGES_TABLE.to_string()
}

impl ChangeEvent {
    /// Insert event for a freshly created row
    pub fn insert(row: Message) -> Self {
        Self {
            kind: ChangeKind::Insert,
            table: default_table(),
            commit_timestamp: Utc::now(),
            new: Some(row),
            old: None,
        }
    }

    /// Update event carrying the full new row
    pub fn update(row: Message) -> Self {
        let old = Some(RowKey { id: row.id.clone() });
        Self {
            kind: ChangeKind::Update,
            table: default_table(),
            commit_timestamp: Utc::now(),
            new: Some(row),
            old,
        }
    }

    /// Delete event carrying only the removed row's key
    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            table: default_table(),
            commit_timestamp: Utc::now(),
            new: None,
            old: Some(RowKey { id: id.into() }),
        }
    }

    /// Id of the affected row
    ///
    /// Inserts and updates are keyed by the new row, deletes by the old key.
    pub fn row_id(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Insert | ChangeKind::Update => self.new.as_ref().map(|m| m.id.as_str()),
            ChangeKind::Delete => self.old.as_ref().map(|k| k.id.as_str()),
        }
    }
}

/// Connection status of a change subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Connecting,
    Connected,
    Retrying,
    Error(String),
    Disconnected,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Connecting => write!(f, "CONNECTING"),
            SubscriptionStatus::Connected => write!(f, "SUBSCRIBED"),
            SubscriptionStatus::Retrying => write!(f, "RETRYING"),
            SubscriptionStatus::Error(reason) => write!(f, "CHANNEL_ERROR ({})", reason),
            SubscriptionStatus::Disconnected => write!(f, "CLOSED"),
        }
    }
}
