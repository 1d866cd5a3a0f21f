/**
 * Application State
 *
 * `AppState` is cloned into every handler. It holds the message store,
 * the user directory, the change broadcast channel and the server
 * configuration. `FromRef` lets handlers extract just the part they need.
 */
use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;
use tokio::sync::broadcast;

use crate::backend::auth::directory::UserDirectory;
use crate::backend::messages::store::MessageStore;
use crate::backend::realtime::broadcast::ChangeBroadcast;
use crate::backend::server::config::ServerConfig;

/// Capacity of the change broadcast channel
pub const CHANGE_CHANNEL_CAPACITY: usize = 1000;

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: MessageStore,
    pub directory: UserDirectory,
    /// Every successful write is published here for the change feed
    pub changes: ChangeBroadcast,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: MessageStore, directory: UserDirectory, config: ServerConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            store,
            directory,
            changes,
            config: Arc::new(config),
        }
    }

    /// State backed by the in-memory store and directory
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(MessageStore::memory(), UserDirectory::memory(), config)
    }

    /// State backed by Postgres
    pub fn postgres(pool: PgPool, config: ServerConfig) -> Self {
        Self::new(MessageStore::Postgres(pool.clone()), UserDirectory::Postgres(pool), config)
    }
}

impl FromRef<AppState> for MessageStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for UserDirectory {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for ChangeBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.changes.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
