use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::storage::Topic;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub event_id: Option<String>,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let topic = match params.event_id.as_deref() {
        None => Topic::AllEvents,
        Some(raw) => match ObjectId::parse_str(raw) {
            Ok(id) => Topic::Event(id),
            Err(_) => return (StatusCode::BAD_REQUEST, "Invalid event_id").into_response(),
        },
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, topic))
}

async fn handle_socket(socket: WebSocket, state: AppState, topic: Topic) {
    let connection_id = Uuid::new_v4().to_string();
    info!(?topic, %connection_id, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    state.ws_storage.add(topic, connection_id.clone(), sender.clone());

    // Send subscribed message
    {
        let msg = serde_json::json!({
            "type": "subscribed",
            "event_id": match topic {
                Topic::Event(id) => Some(id.to_hex()),
                Topic::AllEvents => None,
            },
        });
        let mut guard = sender.lock().await;
        let _ = guard.send(Message::text(msg.to_string())).await;
    }

    // Message loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_message(&sender, &connection_id, text.as_str()).await;
            }
            Ok(Message::Ping(data)) => {
                let mut guard = sender.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                warn!(?topic, %connection_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.ws_storage.remove(&topic, &connection_id);
    info!(?topic, %connection_id, "WebSocket disconnected");
}

async fn handle_client_message(
    sender: &super::storage::WsSender,
    connection_id: &str,
    text: &str,
) {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return,
    };

    let msg_type = parsed.get("type").and_then(|t| t.as_str()).unwrap_or("");
    debug!(%connection_id, msg_type, "WS message received");

    if msg_type == "ping" {
        let pong = serde_json::json!({ "type": "pong" });
        let mut guard = sender.lock().await;
        let _ = guard.send(Message::text(pong.to_string())).await;
    }
}
