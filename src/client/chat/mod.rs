//! Chat Panel Module
//!
//! - **`panel`** - [`ChatPanel`], the mounted message list and its actions
//! - **`prompt`** - [`Prompter`], alerts and confirmations shown to the user

pub mod panel;
pub mod prompt;

pub use panel::{ActionOutcome, ChatPanel, EditDraft};
pub use prompt::{LogPrompter, Prompter, RecordingPrompter};
