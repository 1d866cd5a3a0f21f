//! # Chat Panel
//!
//! Owns the client-visible message list of a mounted chat panel and the
//! actions a user can take on it.
//!
//! ## Lifecycle
//!
//! 1. [`ChatPanel::new`] with an explicit [`Session`]
//! 2. [`ChatPanel::mount`] opens the change subscription, spawns the task
//!    that applies its events, then loads the snapshot
//! 3. [`ChatPanel::send`], [`ChatPanel::edit`], [`ChatPanel::delete`] and the
//!    editing workflow while mounted
//! 4. [`ChatPanel::unmount`] (or dropping the panel) tears the subscription
//!    down
//!
//! Opening the subscription before the snapshot request means rows inserted
//! while the snapshot is in flight are not missed; the timeline reset keeps
//! them.
//!
//! ## Concurrency
//!
//! All state sits behind one `RwLock`. Every list change, whether it comes
//! from the subscription task, a send response or an optimistic action, is
//! a single [`merge_by_id`](crate::client::sync::merge_by_id) under that
//! lock, and the lock is never held across a backend call. Change events
//! may therefore land at any await point of an action without ever
//! producing a duplicate entry.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::prompt::{Prompter, CONFIRM_DELETE, DELETE_FAILED, EDIT_FAILED, SEND_FAILED};
use crate::client::backend::{ChangeFeed, FeedItem, MessageBackend};
use crate::client::sync::{MergeOutcome, MessageTimeline, Mutation};
use crate::shared::{ChangeEvent, Message, NewMessage, Session, SubscriptionStatus, SyncPolicy};

/// Result of a user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Backend accepted the request
    Completed,
    /// Preconditions not met; nothing was done
    Skipped,
    /// User declined the confirmation
    Cancelled,
    /// Backend request failed; the user has been alerted
    Failed,
}

/// Message currently being edited and its draft text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub id: String,
    pub draft: String,
}

#[derive(Debug)]
struct PanelState {
    timeline: MessageTimeline,
    input: String,
    editing: Option<EditDraft>,
    loading: bool,
    status: SubscriptionStatus,
}

pub struct ChatPanel<B: MessageBackend, P: Prompter> {
    session: Session,
    backend: Arc<B>,
    prompter: Arc<P>,
    policy: SyncPolicy,
    state: Arc<RwLock<PanelState>>,
    pump: Option<JoinHandle<()>>,
}

impl<B: MessageBackend, P: Prompter> ChatPanel<B, P> {
    pub fn new(session: Session, backend: Arc<B>, prompter: Arc<P>, policy: SyncPolicy) -> Self {
        let state = PanelState {
            timeline: MessageTimeline::new(policy.ordering),
            input: String::new(),
            editing: None,
            loading: true,
            status: SubscriptionStatus::Disconnected,
        };
        Self {
            session,
            backend,
            prompter,
            policy,
            state: Arc::new(RwLock::new(state)),
            pump: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn is_mounted(&self) -> bool {
        self.pump.is_some()
    }

    /// Open the change subscription and load the snapshot
    pub async fn mount(&mut self) {
        if self.pump.is_some() {
            tracing::warn!("[Chat] Panel already mounted");
            return;
        }
        tracing::info!(
            "[Chat] Mounting chat panel (user: {})",
            self.session.user_id().unwrap_or("anonymous")
        );

        {
            // drop rows left over from an earlier mount
            let mut state = self.state.write().await;
            state.timeline.clear();
            state.timeline.begin_snapshot();
            state.loading = true;
            state.status = SubscriptionStatus::Connecting;
        }

        let feed = self.backend.subscribe();
        self.pump = Some(tokio::spawn(pump_feed(feed, self.state.clone())));
        self.load_snapshot().await;
    }

    /// Tear down the change subscription
    ///
    /// Requests already in flight still complete.
    pub async fn unmount(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            // wait until the task, and the feed it owns, is dropped
            let _ = pump.await;
            self.state.write().await.status = SubscriptionStatus::Disconnected;
            tracing::info!("[Chat] Chat panel unmounted, subscription closed");
        }
    }

    /// Replace the list with the recent window from the backend
    ///
    /// Errors are logged and leave the list as it was.
    pub async fn load_snapshot(&self) {
        self.state.write().await.timeline.begin_snapshot();
        let result = self.backend.fetch_recent(self.policy.snapshot_limit).await;

        let mut state = self.state.write().await;
        match result {
            Ok(rows) => {
                let count = rows.len();
                let kept = state.timeline.reset(rows);
                tracing::info!("[Chat] Loaded {} messages ({} delivered early by the feed)", count, kept);
            }
            Err(e) => {
                tracing::error!("[Chat] Failed to load messages: {}", e);
                state.timeline.abandon_snapshot();
            }
        }
        state.loading = false;
    }

    /// Apply one change event to the list
    pub async fn apply_change(&self, event: ChangeEvent) -> MergeOutcome {
        apply_event(&self.state, event).await
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.input = text.into();
    }

    pub async fn input(&self) -> String {
        self.state.read().await.input.clone()
    }

    /// Send the input text as a new message
    pub async fn send(&self) -> ActionOutcome {
        let Some(user) = self.session.user() else {
            tracing::debug!("[Chat] Send skipped: not signed in");
            return ActionOutcome::Skipped;
        };

        let typed = {
            let mut state = self.state.write().await;
            if state.input.trim().is_empty() {
                return ActionOutcome::Skipped;
            }
            std::mem::take(&mut state.input)
        };

        let message = NewMessage::from_identity(user, typed.trim());
        match self.backend.insert(message).await {
            Ok(row) => {
                tracing::debug!("[Chat] Message {} sent", row.id);
                if self.policy.send.optimistic {
                    let outcome = self.state.write().await.timeline.apply(Mutation::Insert(row));
                    if !outcome.changed() {
                        tracing::debug!("[Chat] Sent message already delivered by the feed");
                    }
                }
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!("[Chat] Error sending message: {}", e);
                self.state.write().await.input = typed;
                self.prompter.alert(SEND_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// Replace the content of one of the user's own messages
    pub async fn edit(&self, id: &str, text: &str) -> ActionOutcome {
        let content = text.trim();
        if content.is_empty() {
            return ActionOutcome::Skipped;
        }
        let Some(current) = self.own_message(id).await else {
            tracing::warn!("[Chat] Edit refused for message {}: not the author", id);
            return ActionOutcome::Skipped;
        };

        let previous = if self.policy.edit.optimistic {
            let edited = Message {
                content: content.to_string(),
                ..current
            };
            match self.state.write().await.timeline.apply(Mutation::Update(edited)) {
                MergeOutcome::Replaced { previous, .. } => Some(previous),
                _ => None,
            }
        } else {
            None
        };

        match self.backend.update_content(id, content).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                if state.editing.as_ref().is_some_and(|e| e.id == id) {
                    state.editing = None;
                }
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!("[Chat] Error editing message {}: {}", id, e);
                if let Some(previous) = previous {
                    self.state.write().await.timeline.apply(Mutation::Update(previous));
                }
                self.prompter.alert(EDIT_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// Delete one of the user's own messages after confirmation
    pub async fn delete(&self, id: &str) -> ActionOutcome {
        if self.own_message(id).await.is_none() {
            tracing::warn!("[Chat] Delete refused for message {}: not the author", id);
            return ActionOutcome::Skipped;
        }
        if !self.prompter.confirm(CONFIRM_DELETE) {
            return ActionOutcome::Cancelled;
        }

        let removed = if self.policy.delete.optimistic {
            match self.state.write().await.timeline.apply(Mutation::Delete(id.to_string())) {
                MergeOutcome::Removed { previous, .. } => Some(previous),
                _ => None,
            }
        } else {
            None
        };

        match self.backend.delete(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                if state.editing.as_ref().is_some_and(|e| e.id == id) {
                    state.editing = None;
                }
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!("[Chat] Error deleting message {}: {}", id, e);
                if let Some(row) = removed {
                    self.state.write().await.timeline.apply(Mutation::Insert(row));
                }
                self.prompter.alert(DELETE_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// Start editing an own message, seeding the draft with its content
    pub async fn start_edit(&self, id: &str) -> bool {
        let Some(message) = self.own_message(id).await else {
            return false;
        };
        self.state.write().await.editing = Some(EditDraft {
            id: message.id,
            draft: message.content,
        });
        true
    }

    pub async fn set_edit_draft(&self, text: impl Into<String>) {
        if let Some(editing) = self.state.write().await.editing.as_mut() {
            editing.draft = text.into();
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.editing = None;
    }

    /// Submit the current draft; the editing state stays on failure
    pub async fn submit_edit(&self) -> ActionOutcome {
        let editing = self.state.read().await.editing.clone();
        match editing {
            Some(EditDraft { id, draft }) => self.edit(&id, &draft).await,
            None => ActionOutcome::Skipped,
        }
    }

    pub async fn editing(&self) -> Option<EditDraft> {
        self.state.read().await.editing.clone()
    }

    /// Whether edit and delete are offered for a message
    pub async fn can_modify(&self, id: &str) -> bool {
        self.own_message(id).await.is_some()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.timeline.messages().to_vec()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn subscription_status(&self) -> SubscriptionStatus {
        self.state.read().await.status.clone()
    }

    async fn own_message(&self, id: &str) -> Option<Message> {
        let user_id = self.session.user_id()?;
        let state = self.state.read().await;
        state.timeline.get(id).filter(|m| m.is_authored_by(user_id)).cloned()
    }
}

impl<B: MessageBackend, P: Prompter> Drop for ChatPanel<B, P> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl<B: MessageBackend, P: Prompter> std::fmt::Debug for ChatPanel<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatPanel")
            .field("session", &self.session)
            .field("policy", &self.policy)
            .field("mounted", &self.pump.is_some())
            .finish()
    }
}

async fn apply_event(state: &RwLock<PanelState>, event: ChangeEvent) -> MergeOutcome {
    let kind = event.kind;
    let id = event.row_id().map(str::to_string);
    let outcome = state.write().await.timeline.apply_event(event);
    tracing::debug!("[Realtime] {} {:?} -> {:?}", kind.as_str(), id, outcome);
    outcome
}

/// Apply feed items to the panel state until the feed ends
async fn pump_feed(mut feed: ChangeFeed, state: Arc<RwLock<PanelState>>) {
    while let Some(item) = feed.next().await {
        match item {
            FeedItem::Status(status) => {
                tracing::info!("[Realtime] Subscription status: {}", status);
                state.write().await.status = status;
            }
            FeedItem::Change(event) => {
                apply_event(&state, event).await;
            }
        }
    }
    tracing::info!("[Realtime] Change feed ended");
    state.write().await.status = SubscriptionStatus::Disconnected;
}
