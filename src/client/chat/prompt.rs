//! User prompts raised by chat actions
//!
//! Write failures surface as blocking alerts and deletes ask for
//! confirmation. The panel reaches the user only through [`Prompter`] so a
//! front-end can render real dialogs and tests can script the answers.

use std::sync::Mutex;

pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
pub const EDIT_FAILED: &str = "Failed to edit message. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete message. Please try again.";
pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this message?";

pub trait Prompter: Send + Sync + 'static {
    /// Show a blocking alert
    fn alert(&self, message: &str);

    /// Ask a yes/no question
    fn confirm(&self, question: &str) -> bool;
}

/// Headless prompter: alerts go to the log, confirmations get a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct LogPrompter {
    pub confirm_answer: bool,
}

impl Default for LogPrompter {
    fn default() -> Self {
        Self { confirm_answer: true }
    }
}

impl Prompter for LogPrompter {
    fn alert(&self, message: &str) {
        tracing::warn!("[Chat] Alert: {}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        tracing::info!("[Chat] Confirm '{}' -> {}", question, self.confirm_answer);
        self.confirm_answer
    }
}

/// Prompter that records what it was asked
#[derive(Debug, Default)]
pub struct RecordingPrompter {
    confirm_answer: bool,
    alerts: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Prompter for RecordingPrompter {
    fn alert(&self, message: &str) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }

    fn confirm(&self, question: &str) -> bool {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        self.confirm_answer
    }
}
