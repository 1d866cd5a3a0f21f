/**
 * Plain Pages
 */
use std::sync::Arc;

use axum::extract::State;

use crate::backend::server::config::ServerConfig;

/// `GET /unauthorized`: where the access middleware sends rejected users
pub async fn unauthorized_page(State(config): State<Arc<ServerConfig>>) -> String {
    format!(
        "Access restricted. This chat is only available to accounts with an email address ending in {}.",
        config.allowed_email_domain
    )
}
