/**
 * Server Initialization
 *
 * Builds the application state from the server configuration (Postgres
 * when reachable, otherwise in-memory) and assembles the router.
 */
use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create the application state for `config`
pub async fn create_state(config: ServerConfig) -> AppState {
    match load_database(config.database_url.as_deref()).await {
        Some(pool) => {
            tracing::info!("[Server] Using Postgres message store");
            AppState::postgres(pool, config)
        }
        None => {
            tracing::info!("[Server] Using in-memory message store");
            AppState::in_memory(config)
        }
    }
}

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing classchat server");
    let state = create_state(config).await;
    let app = create_router(state);
    tracing::info!("[Server] Router configured");
    app
}
