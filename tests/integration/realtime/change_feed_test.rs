//! Change feed tests: writes through the API show up on the SSE stream

use std::collections::VecDeque;
use std::time::Duration;

use axum::body::BodyDataStream;
use axum::http::{Method, StatusCode};
use axum::Router;
use classchat::client::backend::sse::{SseDecoder, SseFrame};
use classchat::shared::{ChangeEvent, ChangeKind};
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{body_json, request, test_app, ASHA};

/// Decoded view of an open change stream
struct Feed {
    body: BodyDataStream,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
}

impl Feed {
    async fn open(app: &Router, query: &str) -> Self {
        let response = app
            .clone()
            .oneshot(request(Method::GET, &format!("/api/messages/changes{}", query), None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/event-stream"));
        Self {
            body: response.into_body().into_data_stream(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    async fn next_frame(&mut self) -> SseFrame {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let Some(frame) = self.pending.pop_front() {
                    return frame;
                }
                let chunk = self.body.next().await.expect("stream open").expect("chunk");
                self.pending.extend(self.decoder.push(&String::from_utf8_lossy(&chunk)));
            }
        })
        .await
        .expect("frame within 2s")
    }

    async fn next_event(&mut self) -> ChangeEvent {
        serde_json::from_str(&self.next_frame().await.data).unwrap()
    }
}

async fn post(app: &Router, content: &str) -> serde_json::Value {
    let body = json!({ "user_id": ASHA.0, "user_name": "Asha", "content": content });
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/messages", Some(ASHA), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_insert_is_streamed() {
    let (_, app) = test_app().await;
    let mut feed = Feed::open(&app, "").await;

    let row = post(&app, "hello").await;

    let frame = feed.next_frame().await;
    assert_eq!(frame.event.as_deref(), Some("INSERT"));
    let event: ChangeEvent = serde_json::from_str(&frame.data).unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
    assert_eq!(event.table, "messages");
    assert_eq!(serde_json::to_value(event.new.unwrap()).unwrap(), row);
}

#[tokio::test]
async fn test_update_and_delete_are_streamed_in_order() {
    let (_, app) = test_app().await;
    let row = post(&app, "typo").await;
    let id = row["id"].as_str().unwrap().to_string();
    let uri = format!("/api/messages/{}", id);

    let mut feed = Feed::open(&app, "").await;

    let patched = app
        .clone()
        .oneshot(request(Method::PATCH, &uri, Some(ASHA), Some(json!({ "content": "fixed" }))))
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);
    let deleted = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, Some(ASHA), None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let update: ChangeEvent = feed.next_event().await;
    assert_eq!(update.kind, ChangeKind::Update);
    assert_eq!(update.new.map(|m| m.content), Some("fixed".to_string()));

    let delete: ChangeEvent = feed.next_event().await;
    assert_eq!(delete.kind, ChangeKind::Delete);
    assert_eq!(delete.row_id(), Some(id.as_str()));
}

#[tokio::test]
async fn test_event_filter() {
    let (_, app) = test_app().await;
    let mut feed = Feed::open(&app, "?events=delete").await;

    let row = post(&app, "short-lived").await;
    let uri = format!("/api/messages/{}", row["id"].as_str().unwrap());
    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &uri, Some(ASHA), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let frame = feed.next_frame().await;
    assert_eq!(frame.event.as_deref(), Some("DELETE"));
}

#[tokio::test]
async fn test_failed_write_is_not_streamed() {
    let (state, app) = test_app().await;
    let mut receiver = state.changes.subscribe();

    let body = json!({ "user_id": "someone_else", "user_name": "X", "content": "nope" });
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/messages", Some(ASHA), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(receiver.try_recv().is_err());
}
