//! Real-time Change Feed
//!
//! Row-level change events of the `messages` table, pushed to subscribers
//! as Server-Sent Events.
//!
//! - **`broadcast`** - the change channel and [`broadcast_change`]
//! - **`subscription`** - `GET /api/messages/changes`
//!
//! # Event Filtering
//!
//! - `?events=insert,delete` - only the listed kinds
//! - `?events=*` or no parameter - every kind

/// Change broadcasting
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::{broadcast_change, ChangeBroadcast};
pub use subscription::handle_change_subscription;
