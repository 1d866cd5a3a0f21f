//! # Message Timeline
//!
//! The client-visible, ordered message list. A derived cache of the backend
//! table: the snapshot seeds it, and from then on it only changes through
//! [`merge_by_id`].
//!
//! Between [`MessageTimeline::begin_snapshot`] and [`MessageTimeline::reset`]
//! the timeline remembers which ids the change feed inserted, updated or
//! deleted, so a snapshot that was read before those changes does not undo
//! them. Everything else the timeline held is replaced by the snapshot.

use std::collections::HashSet;

use super::merge::{merge_by_id, MergeOutcome, Mutation};
use crate::shared::{ChangeEvent, Message, OrderingPolicy};

/// Ids changed while a snapshot request is in flight
#[derive(Debug, Clone, Default)]
struct InFlight {
    arrived: HashSet<String>,
    removed: HashSet<String>,
}

impl InFlight {
    fn record(&mut self, mutation: &Mutation, outcome: &MergeOutcome) {
        match (mutation, outcome) {
            (Mutation::Delete(id), _) => {
                self.arrived.remove(id);
                self.removed.insert(id.clone());
            }
            (_, MergeOutcome::Inserted(_) | MergeOutcome::Replaced { .. }) => {
                self.arrived.insert(mutation.id().to_string());
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageTimeline {
    messages: Vec<Message>,
    ordering: OrderingPolicy,
    in_flight: Option<InFlight>,
}

impl MessageTimeline {
    pub fn new(ordering: OrderingPolicy) -> Self {
        Self {
            messages: Vec::new(),
            ordering,
            in_flight: None,
        }
    }

    /// Drop every row and any pending snapshot bookkeeping
    pub fn clear(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }

    /// Start recording changes that the next [`reset`](Self::reset) must keep
    ///
    /// Calling it again while a snapshot is pending keeps what was recorded.
    pub fn begin_snapshot(&mut self) {
        self.in_flight.get_or_insert_with(InFlight::default);
    }

    /// Forget a snapshot that will never arrive; the rows stay as they are
    pub fn abandon_snapshot(&mut self) {
        self.in_flight = None;
    }

    pub fn snapshot_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replace the contents with a snapshot
    ///
    /// The snapshot arrives oldest first. Rows the feed inserted or updated
    /// since [`begin_snapshot`](Self::begin_snapshot) win over the snapshot's
    /// copy, and rows the feed deleted in that window are left out. Returns
    /// how many feed-delivered rows the snapshot did not contain.
    pub fn reset(&mut self, snapshot: Vec<Message>) -> usize {
        let in_flight = self.in_flight.take().unwrap_or_default();
        let previous = std::mem::replace(&mut self.messages, Vec::with_capacity(snapshot.len()));
        for row in snapshot.into_iter().filter(|row| !in_flight.removed.contains(&row.id)) {
            merge_by_id(&mut self.messages, Mutation::Insert(row), OrderingPolicy::Append);
        }

        let mut kept = 0;
        for row in previous.into_iter().filter(|row| in_flight.arrived.contains(&row.id)) {
            match self.apply(Mutation::Insert(row.clone())) {
                MergeOutcome::Inserted(_) => kept += 1,
                _ => {
                    self.apply(Mutation::Update(row));
                }
            }
        }
        kept
    }

    pub fn apply(&mut self, mutation: Mutation) -> MergeOutcome {
        match self.in_flight.as_mut() {
            Some(in_flight) => {
                let outcome = merge_by_id(&mut self.messages, mutation.clone(), self.ordering);
                in_flight.record(&mutation, &outcome);
                outcome
            }
            None => merge_by_id(&mut self.messages, mutation, self.ordering),
        }
    }

    /// Apply a change event; malformed events leave the list untouched
    pub fn apply_event(&mut self, event: ChangeEvent) -> MergeOutcome {
        let kind = event.kind;
        match Mutation::from_event(event) {
            Some(mutation) => self.apply(mutation),
            None => {
                tracing::warn!("[Chat] Dropping {} event without a row payload", kind.as_str());
                MergeOutcome::Unchanged
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }
}
