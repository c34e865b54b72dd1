use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::{Sink, SinkExt, future::join_all};
use serde::Serialize;
use std::{fmt::Display, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::storage::{Topic, WsStorage};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Event,
    Session,
    Question,
    Feedback,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

/// Upper bound for one connection to accept a message.
const SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends a JSON message to every connection on `topic`.
pub async fn broadcast(ws_storage: &WsStorage, topic: Topic, message: &serde_json::Value) {
    let text = serde_json::to_string(message).unwrap_or_default();
    let senders = ws_storage.get_senders(&topic);
    if senders.is_empty() {
        return;
    }

    let delivered = fan_out(senders, Message::text(text), SEND_TIMEOUT).await;
    debug!(?topic, delivered, "WS message broadcast");
}

/// Sends `message` to all sinks at once, giving each at most `limit`.
/// Returns how many accepted it. A slow or stalled sink is skipped.
async fn fan_out<S>(senders: Vec<Arc<Mutex<S>>>, message: Message, limit: Duration) -> usize
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let sends = senders.into_iter().map(|sender| {
        let message = message.clone();
        async move {
            let send = async {
                let mut guard = sender.lock().await;
                guard.send(message).await
            };
            match tokio::time::timeout(limit, send).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!(%e, "Failed to send WS message");
                    false
                }
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "WS send timed out");
                    false
                }
            }
        }
    });

    join_all(sends).await.into_iter().filter(|ok| *ok).count()
}

/// Tells subscribers of `event_id` (and all-events subscribers) that
/// something under that event changed. Clients re-read through the API.
pub async fn publish_change(
    ws_storage: &WsStorage,
    event_id: ObjectId,
    entity: Entity,
    action: Action,
    id: ObjectId,
) {
    let message = serde_json::json!({
        "type": "event:changed",
        "data": {
            "event_id": event_id.to_hex(),
            "entity": entity,
            "action": action,
            "id": id.to_hex(),
        }
    });

    broadcast(ws_storage, Topic::Event(event_id), &message).await;
    broadcast(ws_storage, Topic::AllEvents, &message).await;
}
