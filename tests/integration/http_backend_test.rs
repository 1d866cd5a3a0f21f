//! HTTP backend against a mock server

use std::time::Duration;

use assert_matches::assert_matches;
use classchat::client::backend::{FeedItem, HttpBackend, MessageBackend};
use classchat::client::{ClientError, Config};
use classchat::shared::{AppConfig, ChangeEvent, NewMessage, SubscriptionStatus};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{identity, message};

fn backend_for(server: &MockServer, token: Option<&str>) -> HttpBackend {
    let mut config = Config::with_builder(AppConfig::builder().server_url(server.uri())).expect("config");
    config.set_token(token.map(str::to_string));
    HttpBackend::new(config)
}

async fn drain(backend: &HttpBackend) -> Vec<FeedItem> {
    tokio::time::timeout(Duration::from_secs(5), backend.subscribe().collect::<Vec<_>>())
        .await
        .expect("feed should end")
}

#[tokio::test]
async fn test_fetch_recent_sends_limit_and_token() {
    let server = MockServer::start().await;
    let rows = vec![message("1", "user_1", "one", 0), message("2", "user_2", "two", 1)];
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .and(query_param("limit", "100"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&rows))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("token-1"));
    let fetched = backend.fetch_recent(100).await.expect("fetch");
    assert_eq!(fetched, rows);
}

#[tokio::test]
async fn test_insert_returns_stored_row() {
    let server = MockServer::start().await;
    let payload = NewMessage::from_identity(&identity("user_1", "Asha"), "hello");
    let stored = payload.clone().into_message("42".to_string(), crate::common::at_minute(3));
    Mock::given(method("POST"))
        .and(path("/api/messages"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(&stored))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("token-1"));
    assert_eq!(backend.insert(payload).await.expect("insert"), stored);
}

#[tokio::test]
async fn test_update_and_delete_hit_row_paths() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/messages/7"))
        .and(body_json(json!({ "content": "edited" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(message("7", "user_1", "edited", 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/messages/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("token-1"));
    backend.update_content("7", "edited").await.expect("update");
    backend.delete("7").await.expect("delete");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/messages/7"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": "Not your message", "status": 403 })))
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("token-1"));
    let err = backend.delete("7").await.expect_err("forbidden");
    assert_matches!(&err, ClientError::Status { status: 403, body } if body.contains("Not your message"));
    assert_eq!(err.http_status(), Some(403));
}

#[tokio::test]
async fn test_fetch_session() {
    let server = MockServer::start().await;
    let me = identity("user_1", "Asha");
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&me))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = backend_for(&server, Some("token-1")).fetch_session().await.expect("session");
    assert_eq!(session.user(), Some(&me));

    let anonymous = backend_for(&server, None).fetch_session().await.expect("session");
    assert!(!anonymous.is_signed_in());
}

#[tokio::test]
async fn test_subscribe_decodes_change_frames() {
    let server = MockServer::start().await;
    let insert = ChangeEvent::insert(message("1", "user_1", "hello", 0));
    let delete = ChangeEvent::delete("1");
    let body = format!(
        ": keep-alive\n\nevent: INSERT\ndata: {}\n\nevent: DELETE\ndata: {}\n\n",
        serde_json::to_string(&insert).expect("json"),
        serde_json::to_string(&delete).expect("json"),
    );
    Mock::given(method("GET"))
        .and(path("/api/messages/changes"))
        .and(header("Accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let items = drain(&backend_for(&server, Some("token-1"))).await;
    assert_eq!(
        items,
        vec![
            FeedItem::Status(SubscriptionStatus::Connecting),
            FeedItem::Status(SubscriptionStatus::Connected),
            FeedItem::Change(insert),
            FeedItem::Change(delete),
            FeedItem::Status(SubscriptionStatus::Disconnected),
        ]
    );
}

#[tokio::test]
async fn test_subscribe_stops_when_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages/changes"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let items = drain(&backend_for(&server, None)).await;
    assert_eq!(
        items,
        vec![
            FeedItem::Status(SubscriptionStatus::Connecting),
            FeedItem::Status(SubscriptionStatus::Error("http: 401 Unauthorized".to_string())),
            FeedItem::Status(SubscriptionStatus::Disconnected),
        ]
    );
}
