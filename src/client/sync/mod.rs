//! Message Synchronization
//!
//! Reconciles the snapshot, the change feed and local optimistic changes
//! into a single ordered list.
//!
//! - **`merge`** - [`merge_by_id`], the one function every list change goes through
//! - **`timeline`** - [`MessageTimeline`], the list itself plus snapshot reset

pub mod merge;
pub mod timeline;

pub use merge::{merge_by_id, MergeOutcome, Mutation};
pub use timeline::MessageTimeline;
