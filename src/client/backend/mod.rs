//! Message Backend Abstraction
//!
//! The chat panel talks to whatever hosts the `messages` table through the
//! [`MessageBackend`] trait: four request/response operations plus a change
//! subscription.
//!
//! # Implementations
//!
//! - **`http`** - [`HttpBackend`], REST + Server-Sent Events against the
//!   `classchat-server` API
//! - **`memory`** - [`MemoryBackend`], an in-process table with a broadcast
//!   change feed and failure injection
//!
//! # Change feeds
//!
//! [`MessageBackend::subscribe`] returns a [`ChangeFeed`], a stream of
//! [`FeedItem`]s (change events interleaved with status updates). Dropping
//! the feed tears the subscription down, including any worker task the
//! transport spawned.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::task::JoinHandle;

use crate::client::error::ClientError;
use crate::shared::{ChangeEvent, Message, NewMessage, SubscriptionStatus};

/// Server-Sent Events decoding
pub mod sse;

/// REST + SSE backend
pub mod http;

/// In-process backend
pub mod memory;

pub use http::HttpBackend;
pub use memory::{FailurePoint, MemoryBackend};

/// One item delivered by a change subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Status(SubscriptionStatus),
    Change(ChangeEvent),
}

/// Operations the chat panel needs from the backend
pub trait MessageBackend: Send + Sync + 'static {
    /// Up to `limit` rows of the recent window, oldest first
    fn fetch_recent(&self, limit: usize) -> impl Future<Output = Result<Vec<Message>, ClientError>> + Send;

    /// Insert a row and return it as stored
    fn insert(&self, message: NewMessage) -> impl Future<Output = Result<Message, ClientError>> + Send;

    /// Replace the content of one row
    fn update_content(&self, id: &str, content: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Hard-delete one row
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Open the change subscription of the `messages` table
    fn subscribe(&self) -> ChangeFeed;
}

/// Live change subscription
///
/// Dropping the feed aborts the worker task behind it, if any.
pub struct ChangeFeed {
    inner: Pin<Box<dyn Stream<Item = FeedItem> + Send>>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    pub fn new(stream: impl Stream<Item = FeedItem> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
            worker: None,
        }
    }

    /// Feed backed by a task that must stop when the feed is dropped
    pub fn with_worker(stream: impl Stream<Item = FeedItem> + Send + 'static, worker: JoinHandle<()>) -> Self {
        Self {
            inner: Box::pin(stream),
            worker: Some(worker),
        }
    }
}

impl Stream for ChangeFeed {
    type Item = FeedItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("has_worker", &self.worker.is_some())
            .finish()
    }
}
