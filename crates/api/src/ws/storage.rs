use axum::extract::ws::{Message, WebSocket};
use bson::oid::ObjectId;
use dashmap::DashMap;
use futures::stream::SplitSink;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// What a connection listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    AllEvents,
    Event(ObjectId),
}

/// Tracks live-update subscribers by topic. A topic can have many
/// connections (tabs, devices), each with its own id.
pub struct WsStorage<S = WsSender> {
    connections: DashMap<Topic, Vec<(String, S)>>,
}

impl WsStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Clone> WsStorage<S> {
    pub fn add(&self, topic: Topic, connection_id: String, sender: S) {
        self.connections
            .entry(topic)
            .or_default()
            .push((connection_id, sender));
    }

    pub fn remove(&self, topic: &Topic, connection_id: &str) {
        if let Some(mut senders) = self.connections.get_mut(topic) {
            senders.retain(|(id, _)| id != connection_id);
        }
        // Re-checked under the shard lock: an `add` may have landed since.
        self.connections
            .remove_if(topic, |_, senders| senders.is_empty());
    }

    pub fn get_senders(&self, topic: &Topic) -> Vec<S> {
        self.connections
            .get(topic)
            .map(|s| s.iter().map(|(_, sender)| sender.clone()).collect())
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections
            .iter()
            .map(|r| r.value().len())
            .sum()
    }
}

impl<S> Default for WsStorage<S> {
    fn default() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }
}
