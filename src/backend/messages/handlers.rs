/**
 * Message Handlers
 *
 * REST endpoints over the `messages` table. Row access rules live here:
 * anyone may read, signed-in users may insert rows authored by
 * themselves, and only the author may update or delete a row.
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::{AuthUser, AuthenticatedUser};
use crate::backend::realtime::broadcast::broadcast_change;
use crate::backend::server::state::AppState;
use crate::shared::config::{DEFAULT_SNAPSHOT_LIMIT, MAX_SNAPSHOT_LIMIT};
use crate::shared::{ChangeEvent, ContentPatch, Message, NewMessage};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Clamp a requested window size to `1..=MAX_SNAPSHOT_LIMIT`
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_SNAPSHOT_LIMIT).clamp(1, MAX_SNAPSHOT_LIMIT)
}

/// `GET /api/messages?limit=N`: the most recent rows, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let limit = clamp_limit(query.limit);
    let messages = state.store.recent(limit).await?;
    tracing::debug!("[Chat] Listing {} messages (limit {})", messages.len(), limit);
    Ok(Json(messages))
}

/// `POST /api/messages`
pub async fn create_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(message): Json<NewMessage>,
) -> Result<(StatusCode, Json<Message>), BackendError> {
    message.validate()?;
    if message.user_id != user.user_id {
        tracing::warn!(
            "[Chat] User {} tried to post as {}",
            user.user_id,
            message.user_id
        );
        return Err(BackendError::forbidden("Messages can only be posted as yourself"));
    }

    let row = state.store.insert(message).await?;
    tracing::info!("[Chat] Message {} created by {}", row.id, row.user_id);
    broadcast_change(&state.changes, ChangeEvent::insert(row.clone()));
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/messages/{id}`
pub async fn update_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ContentPatch>,
) -> Result<Json<Message>, BackendError> {
    let content = patch.content.trim();
    if content.is_empty() {
        return Err(BackendError::bad_request("Message content cannot be empty"));
    }
    authorize_author(&state, &user, &id, "edit").await?;

    let row = state
        .store
        .update_content(&id, content)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;
    tracing::info!("[Chat] Message {} edited", id);
    broadcast_change(&state.changes, ChangeEvent::update(row.clone()));
    Ok(Json(row))
}

/// `DELETE /api/messages/{id}`
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, BackendError> {
    authorize_author(&state, &user, &id, "delete").await?;

    if !state.store.delete(&id).await? {
        return Err(BackendError::not_found("Message not found"));
    }
    tracing::info!("[Chat] Message {} deleted", id);
    broadcast_change(&state.changes, ChangeEvent::delete(id));
    Ok(StatusCode::NO_CONTENT)
}

/// 404 when the row is missing, 403 when the caller is not its author
async fn authorize_author(
    state: &AppState,
    user: &AuthenticatedUser,
    id: &str,
    action: &str,
) -> Result<(), BackendError> {
    let existing = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;
    if !existing.is_authored_by(&user.user_id) {
        tracing::warn!("[Chat] User {} may not {} message {}", user.user_id, action, id);
        return Err(BackendError::forbidden(format!("Only the author can {} this message", action)));
    }
    Ok(())
}
