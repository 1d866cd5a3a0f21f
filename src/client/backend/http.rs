//! HTTP Message Backend
//!
//! REST + Server-Sent Events client for the `classchat-server` API.
//!
//! | Operation        | Request                              |
//! |------------------|--------------------------------------|
//! | `fetch_recent`   | `GET /api/messages?limit=N`          |
//! | `insert`         | `POST /api/messages`                 |
//! | `update_content` | `PATCH /api/messages/{id}`           |
//! | `delete`         | `DELETE /api/messages/{id}`          |
//! | `subscribe`      | `GET /api/messages/changes` (SSE)    |
//! | `fetch_session`  | `GET /api/auth/me`                   |
//!
//! The subscription runs in a spawned task that reconnects with capped
//! exponential backoff when the connection drops, and stops as soon as the
//! [`ChangeFeed`] is dropped.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::sse::SseDecoder;
use super::{ChangeFeed, FeedItem, MessageBackend};
use crate::client::config::Config;
use crate::client::error::ClientError;
use crate::shared::{ChangeEvent, ContentPatch, Message, NewMessage, Session, SubscriptionStatus, UserIdentity};

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(1000);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);
const FEED_BUFFER: usize = 256;

/// Message backend speaking to `classchat-server` over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: Config,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ask the server who the bearer token belongs to
    ///
    /// A 401 means nobody is signed in and yields an anonymous session.
    pub async fn fetch_session(&self) -> Result<Session, ClientError> {
        let response = self
            .authorized(self.client.get(self.config.api_url("/api/auth/me")))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(Session::anonymous());
        }
        let identity: UserIdentity = check(response).await?.json().await?;
        Ok(Session::signed_in(identity))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        authorize(request, self.config.get_token())
    }
}

fn authorize(request: RequestBuilder, token: Option<&String>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", format!("Bearer {}", token)),
        None => request,
    }
}

/// Turn non-success statuses into [`ClientError::Status`]
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|_| status.to_string());
    Err(ClientError::status(status.as_u16(), body))
}

impl MessageBackend for HttpBackend {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, ClientError> {
        let url = self.config.api_url("/api/messages");
        let response = self
            .authorized(self.client.get(&url).query(&[("limit", limit)]))
            .send()
            .await?;
        let messages: Vec<Message> = check(response).await?.json().await?;
        tracing::debug!("[Chat] Fetched {} messages from {}", messages.len(), url);
        Ok(messages)
    }

    async fn insert(&self, message: NewMessage) -> Result<Message, ClientError> {
        let response = self
            .authorized(self.client.post(self.config.api_url("/api/messages")))
            .json(&message)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_content(&self, id: &str, content: &str) -> Result<(), ClientError> {
        let url = self.config.api_url(&format!("/api/messages/{}", id));
        let body = ContentPatch {
            content: content.to_string(),
        };
        let response = self.authorized(self.client.patch(&url)).json(&body).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let url = self.config.api_url(&format!("/api/messages/{}", id));
        let response = self.authorized(self.client.delete(&url)).send().await?;
        check(response).await?;
        Ok(())
    }

    fn subscribe(&self) -> ChangeFeed {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let worker = tokio::spawn(run_subscription(
            self.client.clone(),
            self.config.api_url("/api/messages/changes"),
            self.config.get_token().cloned(),
            tx,
        ));
        ChangeFeed::with_worker(ReceiverStream::new(rx), worker)
    }
}

/// How a single connection attempt ended
enum Attempt {
    /// Server closed the stream cleanly
    Closed,
    /// Connection failed or broke; try again
    Retry,
    /// Retrying cannot help (auth rejected) or the feed was dropped
    Stop,
}

async fn run_subscription(client: Client, url: String, token: Option<String>, tx: mpsc::Sender<FeedItem>) {
    let mut reconnect_delay = INITIAL_RECONNECT_DELAY;

    loop {
        match connect_once(&client, &url, token.as_ref(), &tx, &mut reconnect_delay).await {
            Attempt::Closed => {
                tracing::info!("[Realtime] Change stream closed normally");
                let _ = tx.send(FeedItem::Status(SubscriptionStatus::Disconnected)).await;
                return;
            }
            Attempt::Stop => return,
            Attempt::Retry => {
                if tx.send(FeedItem::Status(SubscriptionStatus::Retrying)).await.is_err() {
                    return;
                }
                tokio::time::sleep(reconnect_delay).await;
                reconnect_delay = std::cmp::min(reconnect_delay * 2, MAX_RECONNECT_DELAY);
            }
        }
    }
}

async fn connect_once(
    client: &Client,
    url: &str,
    token: Option<&String>,
    tx: &mpsc::Sender<FeedItem>,
    reconnect_delay: &mut Duration,
) -> Attempt {
    if tx.send(FeedItem::Status(SubscriptionStatus::Connecting)).await.is_err() {
        return Attempt::Stop;
    }
    tracing::info!("[Realtime] Subscribing to change stream: {}", url);

    let request = authorize(client.get(url).header("Accept", "text/event-stream"), token);
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("[Realtime] Failed to open change stream (will retry): {}", e);
            let _ = tx.send(FeedItem::Status(SubscriptionStatus::Error(format!("network: {}", e)))).await;
            return Attempt::Retry;
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::error!("[Realtime] Change stream rejected with status {}", status);
        let _ = tx.send(FeedItem::Status(SubscriptionStatus::Error(format!("http: {}", status)))).await;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let _ = tx.send(FeedItem::Status(SubscriptionStatus::Disconnected)).await;
            return Attempt::Stop;
        }
        return Attempt::Retry;
    }

    tracing::info!("[Realtime] Change stream established");
    if tx.send(FeedItem::Status(SubscriptionStatus::Connected)).await.is_err() {
        return Attempt::Stop;
    }
    *reconnect_delay = INITIAL_RECONNECT_DELAY;

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut pending = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::error!("[Realtime] Error reading change stream: {}", e);
                let _ = tx.send(FeedItem::Status(SubscriptionStatus::Error(format!("stream: {}", e)))).await;
                return Attempt::Retry;
            }
        };
        pending.extend_from_slice(&chunk);
        let text = match take_utf8(&mut pending) {
            Some(text) => text,
            None => {
                tracing::error!("[Realtime] Invalid UTF-8 in change stream");
                return Attempt::Retry;
            }
        };

        for frame in decoder.push(&text) {
            match serde_json::from_str::<ChangeEvent>(&frame.data) {
                Ok(event) => {
                    tracing::debug!("[Realtime] Received {} for {:?}", event.kind.as_str(), event.row_id());
                    if tx.send(FeedItem::Change(event)).await.is_err() {
                        return Attempt::Stop;
                    }
                }
                Err(e) => {
                    tracing::warn!("[Realtime] Failed to parse change event: {} | data: {}", e, frame.data);
                }
            }
        }
    }

    Attempt::Closed
}

/// Split off the longest valid UTF-8 prefix, keeping a trailing partial
/// character for the next chunk. `None` on bytes that can never be valid.
fn take_utf8(pending: &mut Vec<u8>) -> Option<String> {
    let valid = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => return None,
    };
    let rest = pending.split_off(valid);
    let text = String::from_utf8(std::mem::replace(pending, rest)).ok()?;
    Some(text)
}
