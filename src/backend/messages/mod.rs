//! Messages Module
//!
//! The `messages` table and its REST endpoints.
//!
//! | Route                          | Handler           | Access      |
//! |--------------------------------|-------------------|-------------|
//! | `GET /api/messages?limit=N`    | `list_messages`   | anyone      |
//! | `POST /api/messages`           | `create_message`  | signed in   |
//! | `PATCH /api/messages/{id}`     | `update_message`  | author only |
//! | `DELETE /api/messages/{id}`    | `delete_message`  | author only |
//!
//! Every successful write is published on the change feed.

/// Message persistence
pub mod store;

/// HTTP handlers
pub mod handlers;

pub use handlers::{create_message, delete_message, list_messages, update_message};
pub use store::MessageStore;
