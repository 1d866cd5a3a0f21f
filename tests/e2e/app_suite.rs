//! Two chat panels talking to a live server over HTTP and SSE

use std::net::SocketAddr;
use std::sync::Arc;

use classchat::backend::routes::create_router;
use classchat::client::chat::prompt::RecordingPrompter;
use classchat::client::chat::{ActionOutcome, ChatPanel};
use classchat::client::{Config, HttpBackend};
use classchat::shared::{AppConfig, SubscriptionStatus};
use pretty_assertions::assert_eq;
use serial_test::serial;
use tokio::net::TcpListener;

use crate::common::{test_state, token_for, wait_until, ASHA, RAVI};

type Panel = ChatPanel<HttpBackend, RecordingPrompter>;

async fn spawn_server() -> SocketAddr {
    let state = test_state().await;
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });
    addr
}

async fn connect(addr: SocketAddr, user: (&str, &str)) -> Panel {
    let app = AppConfig::builder()
        .server_url(format!("http://{}", addr))
        .build()
        .expect("config");
    let mut config = Config::from_app_config(app).expect("config");
    config.set_token(Some(token_for(user)));
    let policy = config.sync_policy();

    let backend = HttpBackend::new(config);
    let session = backend.fetch_session().await.expect("session");
    assert!(session.is_signed_in());

    let mut panel = ChatPanel::new(session, Arc::new(backend), Arc::new(RecordingPrompter::answering(true)), policy);
    panel.mount().await;
    let view = &panel;
    wait_until(|| async move { view.subscription_status().await == SubscriptionStatus::Connected }).await;
    panel
}

#[tokio::test]
#[serial]
async fn test_messages_flow_between_panels() {
    let addr = spawn_server().await;
    let asha = connect(addr, ASHA).await;
    let ravi = connect(addr, RAVI).await;

    asha.set_input("Is the lab open today?").await;
    assert_eq!(asha.send().await, ActionOutcome::Completed);

    let r = &ravi;
    wait_until(|| async move { r.messages().await.len() == 1 }).await;
    let seen = ravi.messages().await;
    assert_eq!(seen[0].content, "Is the lab open today?");
    assert_eq!(seen[0].user_id, ASHA.0);
    assert!(!ravi.can_modify(&seen[0].id).await);
    assert!(asha.can_modify(&seen[0].id).await);

    assert_eq!(asha.edit(&seen[0].id, "Is the lab open tomorrow?").await, ActionOutcome::Completed);
    wait_until(|| async move {
        r.messages().await.first().map(|m| m.content.as_str() == "Is the lab open tomorrow?") == Some(true)
    })
    .await;

    assert_eq!(asha.delete(&seen[0].id).await, ActionOutcome::Completed);
    wait_until(|| async move { r.messages().await.is_empty() }).await;
    let a = &asha;
    wait_until(|| async move { a.messages().await.is_empty() }).await;
}

#[tokio::test]
#[serial]
async fn test_late_panel_loads_snapshot() {
    let addr = spawn_server().await;
    let asha = connect(addr, ASHA).await;
    for text in ["one", "two"] {
        asha.set_input(text).await;
        assert_eq!(asha.send().await, ActionOutcome::Completed);
    }

    let ravi = connect(addr, RAVI).await;
    let contents: Vec<String> = ravi.messages().await.into_iter().map(|m| m.content).collect();
    assert_eq!(contents, vec!["one".to_string(), "two".to_string()]);
}
