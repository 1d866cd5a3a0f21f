/**
 * Authentication Middleware
 *
 * `identify` reads the `Authorization: Bearer <token>` header, verifies
 * the JWT and attaches an [`AuthenticatedUser`] to the request
 * extensions. Requests without a valid token continue anonymously;
 * handlers that need a caller take the [`AuthUser`] extractor, which
 * rejects them with 401.
 */
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Caller identified from a verified token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Bearer token of the request, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn identify(State(app_state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match verify_token(&app_state.config.jwt_secret, token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthenticatedUser {
                    user_id: claims.sub,
                    email: claims.email,
                });
            }
            Err(e) => {
                tracing::warn!("[Auth] Ignoring invalid token: {:?}", e);
            }
        }
    }
    next.run(request).await
}

/// Extractor for the authenticated caller
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| BackendError::auth("Sign in required"))
    }
}
