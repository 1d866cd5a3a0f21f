/**
 * Change Subscription Handler
 *
 * `GET /api/messages/changes` streams every change of the `messages`
 * table as Server-Sent Events:
 *
 * ```http
 * event: INSERT
 * data: {"eventType":"INSERT","table":"messages","commit_timestamp":"...","new":{...},"old":null}
 * ```
 *
 * Lagging subscribers skip the events they missed; keep-alive comments
 * hold idle connections open.
 */
use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, Stream};
use tokio::sync::broadcast::error::RecvError;

use crate::backend::realtime::broadcast::ChangeBroadcast;
use crate::shared::ChangeKind;

/// Parse the `events` filter; `None` means every kind
///
/// Unknown names are ignored. A filter naming no known kind, or `*`,
/// subscribes to everything.
pub fn parse_event_filter(raw: Option<&str>) -> Option<Vec<ChangeKind>> {
    let raw = raw?;
    if raw.split(',').any(|name| name.trim() == "*") {
        return None;
    }
    let kinds: Vec<ChangeKind> = raw.split(',').filter_map(ChangeKind::parse).collect();
    if kinds.is_empty() {
        None
    } else {
        Some(kinds)
    }
}

pub async fn handle_change_subscription(
    State(changes): State<ChangeBroadcast>,
    Query(query): Query<HashMap<String, String>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = parse_event_filter(query.get("events").map(String::as_str));
    match &filter {
        Some(kinds) => tracing::info!("[Realtime] New subscriber filtering {:?}", kinds),
        None => tracing::info!("[Realtime] New subscriber for all change kinds"),
    }

    let rx = changes.subscribe();
    let stream = stream::unfold((rx, filter), |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(kinds) = &filter {
                        if !kinds.contains(&event.kind) {
                            continue;
                        }
                    }
                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to serialize change event: {:?}", e);
                            continue;
                        }
                    };
                    let sse_event = Event::default().event(event.kind.as_str()).data(data);
                    return Some((Ok(sse_event), (rx, filter)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::info!("[Realtime] Change channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
