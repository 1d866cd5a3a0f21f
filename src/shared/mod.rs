//! Shared Module
//!
//! This module contains types shared between the chat client and the
//! backend service: the message row, change events, session identity,
//! configuration and error types. All types are designed for serialization
//! and transmission over HTTP.

/// Message data structure
pub mod message;

/// Row change events and subscription status
pub mod event;

/// Signed-in identity passed to the chat panel
pub mod session;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{ContentPatch, Message, NewMessage};
pub use event::{ChangeEvent, ChangeKind, RowKey, SubscriptionStatus};
pub use session::{Session, UserIdentity};
pub use error::SharedError;
pub use config::{ActionPolicy, AppConfig, AppConfigBuilder, ConfigError, OrderingPolicy, SyncPolicy};
