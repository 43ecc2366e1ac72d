use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod events;
pub mod gateway;
pub mod pubsub;

/// A broadcast channel name. Room channels carry a conversation's live
/// traffic; user channels let a participant hear about activity in rooms
/// they are not currently viewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Room(Uuid),
    User(Uuid),
}

/// Unique identifier for a WebSocket subscriber
///
/// Each connection gets a unique subscriber ID when it registers, which
/// allows for precise cleanup when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Connection registry for live subscribers, keyed by channel name.
///
/// Process-wide state with an explicit lifecycle: constructed at service
/// start, entries added/removed as connections open and close.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<Channel, Vec<Subscriber>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber to a channel, returning its id (for cleanup) and
    /// the receiving end of its delivery queue.
    pub async fn add_subscriber(
        &self,
        channel: Channel,
    ) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.entry(channel).or_default().push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            ?channel,
            subscribers = guard.get(&channel).map(|v| v.len()).unwrap_or(0),
            "subscriber added"
        );

        (subscriber_id, rx)
    }

    /// Remove a specific subscriber. Must be called when a connection
    /// closes or the entry leaks until the next broadcast prunes it.
    pub async fn remove_subscriber(&self, channel: Channel, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;

        if let Some(subscribers) = guard.get_mut(&channel) {
            subscribers.retain(|s| s.id != subscriber_id);
            if subscribers.is_empty() {
                guard.remove(&channel);
            }
        }
    }

    /// Deliver a payload to every live subscriber of a channel, dropping
    /// dead senders along the way.
    pub async fn broadcast(&self, channel: Channel, payload: String) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&channel) {
            let before = subscribers.len();
            subscribers.retain(|s| s.sender.send(payload.clone()).is_ok());
            let after = subscribers.len();
            if before != after {
                tracing::debug!(?channel, pruned = before - after, "dead subscribers dropped");
            }
            if subscribers.is_empty() {
                guard.remove(&channel);
            }
        }
    }

    pub async fn subscriber_count(&self, channel: Channel) -> usize {
        let guard = self.inner.read().await;
        guard.get(&channel).map(|v| v.len()).unwrap_or(0)
    }
}
