//! Backend Module
//!
//! The chat server: an Axum HTTP service over the `messages` table with a
//! Server-Sent Events change feed, JWT authentication and an email-domain
//! access gate. Only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, initialization
//! - **`routes`** - Router assembly and plain pages
//! - **`messages`** - Message store (Postgres or in-memory) and REST handlers
//! - **`realtime`** - Change broadcasting and the SSE subscription
//! - **`auth`** - JWT sessions, user directory, `/api/auth/me`
//! - **`middleware`** - Caller identification and the domain gate
//! - **`error`** - [`BackendError`]
//!
//! # Example
//!
//! ```rust,no_run
//! use classchat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Messages table and REST endpoints
pub mod messages;

/// Real-time change feed
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user directory
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use realtime::{broadcast_change, handle_change_subscription, ChangeBroadcast};
pub use server::{create_app, AppState, ServerConfig};
