//! classchat - Main Library
//!
//! A class chat with real-time message synchronization: a message panel
//! whose list is reconciled from an initial snapshot, a live change feed
//! and the user's own actions, plus the server that hosts the messages.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Message rows, change events, session identity
//!   - Configuration and error types
//!
//! - **`client`** - The chat panel and what it talks to
//!   - Idempotent merge and the ordered timeline
//!   - `MessageBackend` trait with HTTP + SSE and in-memory backends
//!   - `ChatPanel` with send, edit and delete actions
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum REST API over the `messages` table
//!   - Server-Sent Events change feed
//!   - JWT authentication and the email-domain access gate
//!   - Postgres persistence with an in-memory fallback
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and the
//!   `classchat-server` binary
//!
//! # Consistency Model
//!
//! The client list is an eventually consistent cache of the `messages`
//! table. Every change to it is a merge keyed on the row id, so a row that
//! arrives both through the change feed and as the response to the user's
//! own send appears exactly once. Concurrent edits resolve last write wins.

/// Shared types and data structures
pub mod shared;

/// Chat client: synchronization, backends and the chat panel
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
