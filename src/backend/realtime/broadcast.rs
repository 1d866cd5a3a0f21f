/**
 * Change Broadcasting
 *
 * Writes publish their [`ChangeEvent`] on a `tokio::sync::broadcast`
 * channel; each SSE subscriber holds its own receiver.
 */
use tokio::sync::broadcast;

use crate::shared::ChangeEvent;

/// Sender half of the change channel
pub type ChangeBroadcast = broadcast::Sender<ChangeEvent>;

/// Publish a change to every subscriber
///
/// Returns how many subscribers received it (0 when nobody listens).
pub fn broadcast_change(changes: &ChangeBroadcast, event: ChangeEvent) -> usize {
    let kind = event.kind;
    match changes.send(event) {
        Ok(subscriber_count) => {
            tracing::info!(
                "[Realtime] {} broadcast to {} subscribers",
                kind.as_str(),
                subscriber_count
            );
            subscriber_count
        }
        Err(_) => {
            tracing::debug!("[Realtime] No subscribers to receive {}", kind.as_str());
            0
        }
    }
}
