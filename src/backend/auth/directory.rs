/**
 * User Directory
 *
 * Server-side source of user profiles: display-name parts, avatar and the
 * list of email addresses. The access middleware reads the primary email
 * from here rather than trusting anything the client sends.
 *
 * Backed by the Postgres `users` table, or by an in-memory map when no
 * database is configured.
 */
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::backend::error::BackendError;
use crate::shared::UserIdentity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct DirectoryUser {
    pub id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    /// Email addresses, primary first
    pub email_addresses: Vec<String>,
}

impl DirectoryUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: None,
            first_name: None,
            username: None,
            avatar_url: None,
            email_addresses: vec![email.into()],
        }
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses.first().map(String::as_str)
    }

    pub fn to_identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            first_name: self.first_name.clone(),
            username: self.username.clone(),
            primary_email: self.primary_email().map(str::to_string),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum UserDirectory {
    Postgres(PgPool),
    Memory(Arc<RwLock<HashMap<String, DirectoryUser>>>),
}

impl UserDirectory {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn find(&self, id: &str) -> Result<Option<DirectoryUser>, BackendError> {
        match self {
            Self::Postgres(pool) => {
                let user = sqlx::query_as::<_, DirectoryUser>(
                    r#"
                    SELECT id, full_name, first_name, username, avatar_url, email_addresses
                    FROM users
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;
                Ok(user)
            }
            Self::Memory(users) => Ok(users.read().await.get(id).cloned()),
        }
    }

    /// Primary email of a user; `None` when the user or the email is missing
    pub async fn primary_email(&self, id: &str) -> Result<Option<String>, BackendError> {
        Ok(self
            .find(id)
            .await?
            .and_then(|user| user.primary_email().map(str::to_string)))
    }

    /// Create or replace a user
    pub async fn upsert(&self, user: DirectoryUser) -> Result<(), BackendError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO users (id, full_name, first_name, username, avatar_url, email_addresses)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO UPDATE
                    SET full_name = EXCLUDED.full_name,
                        first_name = EXCLUDED.first_name,
                        username = EXCLUDED.username,
                        avatar_url = EXCLUDED.avatar_url,
                        email_addresses = EXCLUDED.email_addresses
                    "#,
                )
                .bind(&user.id)
                .bind(&user.full_name)
                .bind(&user.first_name)
                .bind(&user.username)
                .bind(&user.avatar_url)
                .bind(&user.email_addresses)
                .execute(pool)
                .await?;
            }
            Self::Memory(users) => {
                users.write().await.insert(user.id.clone(), user);
            }
        }
        Ok(())
    }
}
