/**
 * Get Current User Handler
 *
 * `GET /api/auth/me` returns the caller's identity from the user
 * directory, in the shape the chat client turns into a `Session`.
 *
 * # Errors
 *
 * * `401 Unauthorized` - no valid bearer token
 * * `404 Not Found` - token subject unknown to the directory
 */
use axum::{extract::State, response::Json};

use crate::backend::auth::directory::UserDirectory;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::UserIdentity;

pub async fn get_me(
    State(directory): State<UserDirectory>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserIdentity>, BackendError> {
    let profile = directory.find(&user.user_id).await?.ok_or_else(|| {
        tracing::warn!("[Auth] User not found in directory: {}", user.user_id);
        BackendError::not_found("User not found")
    })?;
    Ok(Json(profile.to_identity()))
}
