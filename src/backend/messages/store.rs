/**
 * Message Store
 *
 * Persistence of the `messages` table. Postgres when a database is
 * configured, otherwise an in-memory table kept in `created_at` order.
 * Ids are UUID strings assigned here; `created_at` is assigned at insert.
 */
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::error::BackendError;
use crate::shared::{Message, NewMessage};

#[derive(Clone, Debug)]
pub enum MessageStore {
    Postgres(PgPool),
    Memory(Arc<RwLock<Vec<Message>>>),
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: String,
    user_id: String,
    user_name: String,
    user_email: Option<String>,
    avatar_url: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            avatar_url: row.avatar_url,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

impl MessageStore {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(RwLock::new(Vec::new())))
    }

    /// The `limit` most recent rows, oldest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<Message>, BackendError> {
        match self {
            Self::Postgres(pool) => {
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                let rows = sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, user_id, user_name, user_email, avatar_url, content, created_at
                    FROM (
                        SELECT id, user_id, user_name, user_email, avatar_url, content, created_at
                        FROM messages
                        ORDER BY created_at DESC
                        LIMIT $1
                    ) recent
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(limit)
                .fetch_all(pool)
                .await?;
                Ok(rows.into_iter().map(Message::from).collect())
            }
            Self::Memory(rows) => {
                let rows = rows.read().await;
                let start = rows.len().saturating_sub(limit);
                Ok(rows[start..].to_vec())
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Message>, BackendError> {
        match self {
            Self::Postgres(pool) => {
                let row = sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, user_id, user_name, user_email, avatar_url, content, created_at
                    FROM messages
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(Message::from))
            }
            Self::Memory(rows) => Ok(rows.read().await.iter().find(|m| m.id == id).cloned()),
        }
    }

    /// Insert a row and return it as stored
    pub async fn insert(&self, message: NewMessage) -> Result<Message, BackendError> {
        let id = uuid::Uuid::new_v4().to_string();
        match self {
            Self::Postgres(pool) => {
                let row = sqlx::query_as::<_, MessageRow>(
                    r#"
                    INSERT INTO messages (id, user_id, user_name, user_email, avatar_url, content)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, user_id, user_name, user_email, avatar_url, content, created_at
                    "#,
                )
                .bind(&id)
                .bind(&message.user_id)
                .bind(&message.user_name)
                .bind(&message.user_email)
                .bind(&message.avatar_url)
                .bind(&message.content)
                .fetch_one(pool)
                .await?;
                Ok(row.into())
            }
            Self::Memory(rows) => {
                let mut rows = rows.write().await;
                let mut created_at = Utc::now();
                if let Some(last) = rows.last() {
                    // keep the table strictly ordered even within one clock tick
                    if created_at <= last.created_at {
                        created_at = last.created_at + chrono::Duration::microseconds(1);
                    }
                }
                let row = message.into_message(id, created_at);
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    /// Replace a row's content; `None` when the row does not exist
    pub async fn update_content(&self, id: &str, content: &str) -> Result<Option<Message>, BackendError> {
        match self {
            Self::Postgres(pool) => {
                let row = sqlx::query_as::<_, MessageRow>(
                    r#"
                    UPDATE messages
                    SET content = $1
                    WHERE id = $2
                    RETURNING id, user_id, user_name, user_email, avatar_url, content, created_at
                    "#,
                )
                .bind(content)
                .bind(id)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(Message::from))
            }
            Self::Memory(rows) => Ok(rows.write().await.iter_mut().find(|m| m.id == id).map(|row| {
                row.content = content.to_string();
                row.clone()
            })),
        }
    }

    /// Delete a row; `false` when it did not exist
    pub async fn delete(&self, id: &str) -> Result<bool, BackendError> {
        match self {
            Self::Postgres(pool) => {
                let result = sqlx::query("DELETE FROM messages WHERE id = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }
            Self::Memory(rows) => {
                let mut rows = rows.write().await;
                let before = rows.len();
                rows.retain(|m| m.id != id);
                Ok(rows.len() != before)
            }
        }
    }
}
