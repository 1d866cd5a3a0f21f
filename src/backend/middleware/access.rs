/**
 * Domain Access Middleware
 *
 * Admits signed-in users only when the primary email on record in the user
 * directory ends with the configured domain (compared case-insensitively).
 * Anyone else is redirected to `/unauthorized`. Requests without a signed-in
 * user pass through.
 *
 * The gate skips `/unauthorized` itself, `/static` and static-asset paths,
 * and always runs on `/api` and `/trpc`. `/static` stands in for a
 * front-end framework's internal asset prefix. `/api` and `/trpc` match
 * whole path segments only: `/apiary` is an ordinary page. If the directory lookup
 * itself fails the request passes through and the error is logged.
 */
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::state::AppState;

pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Extension prefixes following a '.' that mark a static asset
///
/// Prefix matching covers `html`/`htm`, `jpeg`/`jpg`, `woff2`, `docx` and
/// `xlsx`. `js` is handled separately so that `.json` is not an asset.
const ASSET_EXTENSIONS: &[&str] = &[
    "htm", "css", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff", "ico", "csv", "doc", "xls", "zip",
    "webmanifest",
];

/// Whether `path` looks like a static asset
///
/// An extension anywhere in the path counts, not only at the end.
pub fn is_static_asset(path: &str) -> bool {
    path.match_indices('.').any(|(index, _)| {
        let rest = &path[index + 1..];
        if let Some(after_js) = rest.strip_prefix("js") {
            if !after_js.starts_with("on") {
                return true;
            }
        }
        ASSET_EXTENSIONS.iter().any(|ext| rest.starts_with(ext))
    })
}

/// Whether the domain gate applies to `path`
pub fn requires_access_check(path: &str) -> bool {
    if is_under(path, "/api") || is_under(path, "/trpc") {
        return true;
    }
    if path.starts_with(UNAUTHORIZED_PATH) || is_under(path, "/static") {
        return false;
    }
    !is_static_asset(path)
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Case-insensitive suffix check of `email` against `domain` (`@example.edu`)
pub fn email_allowed(email: &str, domain: &str) -> bool {
    email.trim().to_ascii_lowercase().ends_with(&domain.to_ascii_lowercase())
}

pub async fn domain_gate(State(app_state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !requires_access_check(&path) {
        return next.run(request).await;
    }
    let Some(user) = request.extensions().get::<AuthenticatedUser>().cloned() else {
        return next.run(request).await;
    };

    match app_state.directory.primary_email(&user.user_id).await {
        Ok(Some(email)) if email_allowed(&email, &app_state.config.allowed_email_domain) => next.run(request).await,
        Ok(email) => {
            tracing::info!(
                "[Access] Redirecting user {} ({}) from {} to {}",
                user.user_id,
                email.as_deref().unwrap_or("no email"),
                path,
                UNAUTHORIZED_PATH
            );
            Redirect::temporary(UNAUTHORIZED_PATH).into_response()
        }
        Err(e) => {
            tracing::error!("[Access] Error checking user email: {}", e);
            next.run(request).await
        }
    }
}
