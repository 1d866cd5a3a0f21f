//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! - **`config`** - [`ServerConfig`] from the environment, database connection
//! - **`state`** - [`AppState`] and its `FromRef` implementations
//! - **`init`** - State creation and router assembly
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `ServerConfig::from_env()`
//! 2. **Persistence**: connect to Postgres and migrate, or fall back to memory
//! 3. **State**: store, user directory, change broadcast channel
//! 4. **Router**: routes, access middleware, static files

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
