//! In-process Message Backend
//!
//! A `messages` table kept in memory with a broadcast change feed, for
//! running the chat panel without a server. It assigns sequential ids
//! (`"1"`, `"2"`, ...) and strictly increasing `created_at` timestamps.
//!
//! Two hooks make interleavings reproducible:
//!
//! - [`MemoryBackend::fail_next`] makes the next call of one operation fail.
//! - [`MemoryBackend::gate_next_insert`] makes the next insert publish its
//!   change event and then wait for the returned [`Notify`] before it
//!   returns, so the event is guaranteed to be observable first.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use futures_util::{future, stream, StreamExt};
use tokio::sync::{broadcast, Notify, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::{ChangeFeed, FeedItem, MessageBackend};
use crate::client::error::ClientError;
use crate::shared::{ChangeEvent, Message, NewMessage, SubscriptionStatus};

const CHANNEL_CAPACITY: usize = 1000;

/// Operation that [`MemoryBackend::fail_next`] can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    FetchRecent,
    Insert,
    Update,
    Delete,
}

#[derive(Debug)]
pub struct MemoryBackend {
    rows: RwLock<Vec<Message>>,
    changes: broadcast::Sender<ChangeEvent>,
    next_id: AtomicU64,
    last_created_at: Mutex<Option<DateTime<Utc>>>,
    failures: Mutex<HashSet<FailurePoint>>,
    insert_gate: Mutex<Option<Arc<Notify>>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            rows: RwLock::new(Vec::new()),
            changes,
            next_id: AtomicU64::new(1),
            last_created_at: Mutex::new(None),
            failures: Mutex::new(HashSet::new()),
            insert_gate: Mutex::new(None),
        }
    }

    /// Pre-populate the table without emitting change events
    pub async fn seed(&self, rows: Vec<Message>) {
        let mut table = self.rows.write().await;
        table.extend(rows);
        table.sort_by_key(|m| m.created_at);
        if let Some(newest) = table.last() {
            let mut clock = self.lock_clock();
            *clock = (*clock).max(Some(newest.created_at));
        }
        // keep generated ids clear of seeded numeric ids
        let max_numeric = table.iter().filter_map(|m| m.id.parse::<u64>().ok()).max().unwrap_or(0);
        self.next_id.fetch_max(max_numeric + 1, Ordering::SeqCst);
    }

    /// Current table contents, oldest first
    pub async fn rows(&self) -> Vec<Message> {
        self.rows.read().await.clone()
    }

    /// Make the next call of `point` fail with [`ClientError::Rejected`]
    pub fn fail_next(&self, point: FailurePoint) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(point);
    }

    /// Hold the next insert after its change event has been published
    ///
    /// The insert returns once the returned `Notify` is notified.
    pub fn gate_next_insert(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.insert_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(gate.clone());
        gate
    }

    /// Number of open change subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Publish an event as if another client had changed the table
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.changes.send(event).unwrap_or(0)
    }

    fn take_failure(&self, point: FailurePoint) -> Result<(), ClientError> {
        let armed = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&point);
        if armed {
            tracing::debug!("[Chat] Injected failure for {:?}", point);
            return Err(ClientError::rejected(format!("{:?} failed", point)));
        }
        Ok(())
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Utc>>> {
        self.last_created_at.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_created_at(&self) -> DateTime<Utc> {
        let mut last = self.lock_clock();
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

impl MessageBackend for MemoryBackend {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, ClientError> {
        self.take_failure(FailurePoint::FetchRecent)?;
        let rows = self.rows.read().await;
        let start = rows.len().saturating_sub(limit);
        Ok(rows[start..].to_vec())
    }

    async fn insert(&self, message: NewMessage) -> Result<Message, ClientError> {
        self.take_failure(FailurePoint::Insert)?;
        message.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let row = message.into_message(id, self.next_created_at());
        self.rows.write().await.push(row.clone());
        self.publish(ChangeEvent::insert(row.clone()));

        let gate = self
            .insert_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(row)
    }

    async fn update_content(&self, id: &str, content: &str) -> Result<(), ClientError> {
        self.take_failure(FailurePoint::Update)?;
        let updated = {
            let mut rows = self.rows.write().await;
            rows.iter_mut().find(|m| m.id == id).map(|row| {
                row.content = content.to_string();
                row.clone()
            })
        };
        if let Some(row) = updated {
            self.publish(ChangeEvent::update(row));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.take_failure(FailurePoint::Delete)?;
        let removed = {
            let mut rows = self.rows.write().await;
            let before = rows.len();
            rows.retain(|m| m.id != id);
            rows.len() != before
        };
        if removed {
            self.publish(ChangeEvent::delete(id));
        }
        Ok(())
    }

    fn subscribe(&self) -> ChangeFeed {
        let changes = BroadcastStream::new(self.changes.subscribe()).filter_map(|item| {
            future::ready(match item {
                Ok(event) => Some(FeedItem::Change(event)),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Subscriber lagged, skipped {} events", skipped);
                    None
                }
            })
        });
        let connected = stream::once(future::ready(FeedItem::Status(SubscriptionStatus::Connected)));
        ChangeFeed::new(connected.chain(changes))
    }
}
