//! # Idempotent Merge
//!
//! Every change to the chat timeline goes through [`merge_by_id`], whether it
//! comes from the change feed, from the row returned by a send, or from an
//! optimistic edit/delete and its rollback. Funnelling both paths through
//! one function is what keeps the list free of duplicates when the
//! subscription and the sender race to insert the same row.
//!
//! Rules, keyed on `id`:
//!
//! - **Insert**: ignored if the id is already present, otherwise placed by
//!   the [`OrderingPolicy`].
//! - **Update**: the matching entry is replaced wholesale; absent ids are
//!   ignored.
//! - **Delete**: the matching entry is removed; absent ids are ignored.

use crate::shared::{ChangeEvent, ChangeKind, Message, OrderingPolicy};

/// A mutation to apply to the timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Insert(Message),
    Update(Message),
    Delete(String),
}

impl Mutation {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Mutation::Insert(_) => ChangeKind::Insert,
            Mutation::Update(_) => ChangeKind::Update,
            Mutation::Delete(_) => ChangeKind::Delete,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Mutation::Insert(row) | Mutation::Update(row) => &row.id,
            Mutation::Delete(id) => id,
        }
    }

    /// Convert a change event; `None` when the event lacks the row it needs
    pub fn from_event(event: ChangeEvent) -> Option<Self> {
        match event.kind {
            ChangeKind::Insert => event.new.map(Mutation::Insert),
            ChangeKind::Update => event.new.map(Mutation::Update),
            ChangeKind::Delete => event.old.map(|key| Mutation::Delete(key.id)),
        }
    }
}

/// What a merge did to the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Row inserted at the given index
    Inserted(usize),
    /// Row at the given index replaced; carries the previous row
    Replaced { index: usize, previous: Message },
    /// Row removed from the given index
    Removed { index: usize, previous: Message },
    /// Nothing changed (duplicate insert, or unknown id for update/delete)
    Unchanged,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, MergeOutcome::Unchanged)
    }
}

/// Apply `mutation` to `list`, keeping at most one entry per id
pub fn merge_by_id(list: &mut Vec<Message>, mutation: Mutation, ordering: OrderingPolicy) -> MergeOutcome {
    match mutation {
        Mutation::Insert(row) => {
            if list.iter().any(|m| m.id == row.id) {
                return MergeOutcome::Unchanged;
            }
            let index = match ordering {
                OrderingPolicy::Append => list.len(),
                OrderingPolicy::ByCreatedAt => list.partition_point(|m| m.created_at <= row.created_at),
            };
            list.insert(index, row);
            MergeOutcome::Inserted(index)
        }
        Mutation::Update(row) => match list.iter().position(|m| m.id == row.id) {
            Some(index) => {
                let previous = std::mem::replace(&mut list[index], row);
                MergeOutcome::Replaced { index, previous }
            }
            None => MergeOutcome::Unchanged,
        },
        Mutation::Delete(id) => match list.iter().position(|m| m.id == id) {
            Some(index) => {
                let previous = list.remove(index);
                MergeOutcome::Removed { index, previous }
            }
            None => MergeOutcome::Unchanged,
        },
    }
}
