//! Chat panel synchronization against the in-memory backend
//!
//! Each test mounts a panel, drives the backend or the panel, and waits for
//! the list to settle.

use std::sync::Arc;

use assert_matches::assert_matches;
use classchat::client::backend::{FailurePoint, MemoryBackend, MessageBackend};
use classchat::client::chat::prompt::{RecordingPrompter, CONFIRM_DELETE, SEND_FAILED};
use classchat::client::chat::{ActionOutcome, ChatPanel};
use classchat::shared::{ChangeEvent, Message, Session, SubscriptionStatus, SyncPolicy};
use pretty_assertions::assert_eq;

use crate::common::{message, signed_in, wait_until};

type Panel = ChatPanel<MemoryBackend, RecordingPrompter>;

async fn mounted(session: Session, backend: &Arc<MemoryBackend>) -> (Panel, Arc<RecordingPrompter>) {
    let prompter = Arc::new(RecordingPrompter::answering(true));
    let mut panel = ChatPanel::new(session, backend.clone(), prompter.clone(), SyncPolicy::default());
    panel.mount().await;
    let view = &panel;
    wait_until(|| async move { view.subscription_status().await == SubscriptionStatus::Connected }).await;
    (panel, prompter)
}

fn contents(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.content.as_str()).collect()
}

#[tokio::test]
async fn test_insert_event_into_empty_snapshot() {
    let backend = Arc::new(MemoryBackend::new());
    let (panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    assert!(panel.messages().await.is_empty());
    assert!(!panel.is_loading().await);

    let row = message("1", "user_2", "Good morning", 0);
    backend.publish(ChangeEvent::insert(row.clone()));

    let view = &panel;
    wait_until(|| async move { view.messages().await.len() == 1 }).await;
    assert_eq!(panel.messages().await, vec![row]);
}

#[tokio::test]
async fn test_update_event_replaces_the_row() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed(vec![message("1", "user_2", "draft", 0)]).await;
    let (panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    assert_eq!(contents(&panel.messages().await), vec!["draft"]);

    let edited = message("1", "user_2", "edited", 0);
    backend.publish(ChangeEvent::update(edited.clone()));

    let view = &panel;
    wait_until(|| async move { contents(&view.messages().await) == vec!["edited"] }).await;
    assert_eq!(panel.messages().await, vec![edited]);
}

#[tokio::test]
async fn test_delete_event_removes_the_row() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed(vec![message("1", "user_2", "bye", 0)]).await;
    let (panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    assert_eq!(panel.messages().await.len(), 1);

    backend.publish(ChangeEvent::delete("1"));

    let view = &panel;
    wait_until(|| async move { view.messages().await.is_empty() }).await;
}

#[tokio::test]
async fn test_send_racing_its_own_insert_event_appears_once() {
    let backend = Arc::new(MemoryBackend::new());
    let (panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;

    // the insert response is held back until the feed has delivered the row
    let gate = backend.gate_next_insert();
    panel.set_input("hello class").await;

    let view = &panel;
    let (outcome, ()) = tokio::join!(view.send(), async move {
        wait_until(|| async move { view.messages().await.len() == 1 }).await;
        gate.notify_one();
    });

    assert_eq!(outcome, ActionOutcome::Completed);
    let messages = panel.messages().await;
    assert_eq!(contents(&messages), vec!["hello class"]);
    assert_eq!(backend.rows().await, messages);
    assert_eq!(panel.input().await, "");
}

#[tokio::test]
async fn test_send_trims_and_snapshots_author() {
    let backend = Arc::new(MemoryBackend::new());
    let (panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;

    panel.set_input("  spaced out  ").await;
    assert_eq!(panel.send().await, ActionOutcome::Completed);

    let rows = backend.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content, "spaced out");
    assert_eq!(rows[0].user_id, "user_1");
    assert_eq!(rows[0].user_name, "Asha");
    assert_eq!(rows[0].user_email.as_deref(), Some("asha@sahyadri.edu.in"));
}

#[tokio::test]
async fn test_blank_send_is_a_no_op() {
    let backend = Arc::new(MemoryBackend::new());
    let (panel, prompter) = mounted(signed_in("user_1", "Asha"), &backend).await;

    panel.set_input("   ").await;
    assert_eq!(panel.send().await, ActionOutcome::Skipped);

    assert!(backend.rows().await.is_empty());
    assert!(panel.messages().await.is_empty());
    assert_eq!(panel.input().await, "   ");
    assert!(prompter.alerts().is_empty());
}

#[tokio::test]
async fn test_signed_out_send_is_a_no_op() {
    let backend = Arc::new(MemoryBackend::new());
    let (panel, _) = mounted(Session::anonymous(), &backend).await;

    panel.set_input("hello").await;
    assert_eq!(panel.send().await, ActionOutcome::Skipped);
    assert!(backend.rows().await.is_empty());
}

#[tokio::test]
async fn test_failed_send_restores_the_input() {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed(vec![message("1", "user_2", "earlier", 0)]).await;
    let (panel, prompter) = mounted(signed_in("user_1", "Asha"), &backend).await;
    let before = panel.messages().await;

    backend.fail_next(FailurePoint::Insert);
    panel.set_input("lost?").await;
    assert_eq!(panel.send().await, ActionOutcome::Failed);

    assert_eq!(panel.input().await, "lost?");
    assert_eq!(panel.messages().await, before);
    assert_eq!(prompter.alerts(), vec![SEND_FAILED.to_string()]);
}

#[tokio::test]
async fn test_edit_and_delete_own_message_through_the_feed() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .seed(vec![message("1", "user_1", "typo", 0), message("2", "user_2", "not mine", 1)])
        .await;
    let (panel, prompter) = mounted(signed_in("user_1", "Asha"), &backend).await;

    assert!(panel.can_modify("1").await);
    assert!(!panel.can_modify("2").await);
    assert_eq!(panel.edit("2", "hijacked").await, ActionOutcome::Skipped);

    assert!(panel.start_edit("1").await);
    panel.set_edit_draft("fixed").await;
    assert_eq!(panel.submit_edit().await, ActionOutcome::Completed);
    assert_eq!(panel.editing().await, None);

    let view = &panel;
    wait_until(|| async move { contents(&view.messages().await) == vec!["fixed", "not mine"] }).await;

    assert_eq!(panel.delete("1").await, ActionOutcome::Completed);
    assert_eq!(prompter.questions(), vec![CONFIRM_DELETE.to_string()]);
    wait_until(|| async move { contents(&view.messages().await) == vec!["not mine"] }).await;
}

#[tokio::test]
async fn test_two_panels_converge() {
    let backend = Arc::new(MemoryBackend::new());
    let (asha, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    let (ravi, _) = mounted(signed_in("user_2", "Ravi"), &backend).await;

    asha.set_input("first").await;
    assert_eq!(asha.send().await, ActionOutcome::Completed);
    ravi.set_input("second").await;
    assert_eq!(ravi.send().await, ActionOutcome::Completed);

    let (a, r) = (&asha, &ravi);
    wait_until(|| async move { a.messages().await.len() == 2 && r.messages().await.len() == 2 }).await;
    assert_eq!(asha.messages().await, ravi.messages().await);
    assert_eq!(contents(&asha.messages().await), vec!["first", "second"]);
}

#[tokio::test]
async fn test_unmount_closes_the_subscription() {
    let backend = Arc::new(MemoryBackend::new());
    let (mut panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    assert_eq!(backend.subscriber_count(), 1);

    panel.unmount().await;
    assert!(!panel.is_mounted());
    assert_eq!(backend.subscriber_count(), 0);
    assert_matches!(panel.subscription_status().await, SubscriptionStatus::Disconnected);

    backend.publish(ChangeEvent::insert(message("9", "user_2", "too late", 5)));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(panel.messages().await.is_empty());
}

#[tokio::test]
async fn test_remount_shows_only_current_rows() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .seed(vec![message("1", "user_2", "old", 0), message("2", "user_2", "kept", 1)])
        .await;
    let (mut panel, _) = mounted(signed_in("user_1", "Asha"), &backend).await;
    panel.unmount().await;

    MessageBackend::delete(&*backend, "1").await.unwrap();
    panel.mount().await;
    assert_eq!(contents(&panel.messages().await), vec!["kept"]);

    panel.unmount().await;
    backend.fail_next(FailurePoint::FetchRecent);
    panel.mount().await;
    assert!(panel.messages().await.is_empty());
}
