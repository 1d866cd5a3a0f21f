//! Chat Client Module
//!
//! Everything that runs on the client side of the chat: the message list
//! synchronization, the backends it can talk to and the panel that ties
//! them together.
//!
//! # Architecture
//!
//! - **`config`** - Client configuration (server URL, bearer token, sync policy)
//! - **`error`** - [`ClientError`]
//! - **`sync`** - Idempotent merge and the ordered message timeline
//! - **`backend`** - [`MessageBackend`] trait with HTTP and in-memory implementations
//! - **`chat`** - [`ChatPanel`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use classchat::client::{ChatPanel, Config, HttpBackend, LogPrompter};
//!
//! # async fn run() -> Result<(), classchat::client::ClientError> {
//! let config = Config::default();
//! let policy = config.sync_policy();
//! let backend = Arc::new(HttpBackend::new(config));
//! let session = backend.fetch_session().await?;
//!
//! let mut panel = ChatPanel::new(session, backend, Arc::new(LogPrompter::default()), policy);
//! panel.mount().await;
//! panel.set_input("hello class").await;
//! panel.send().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sync;
pub mod backend;
pub mod chat;

pub use config::Config;
pub use error::ClientError;
pub use backend::{ChangeFeed, FeedItem, HttpBackend, MemoryBackend, MessageBackend};
pub use chat::{ActionOutcome, ChatPanel, EditDraft, LogPrompter, Prompter};
