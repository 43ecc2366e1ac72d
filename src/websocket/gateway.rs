//! Fanout of newly persisted activity to live subscribers.
//!
//! The gateway is handed its transports at construction and treats both as
//! optional: a registry-less, redis-less gateway is a valid configuration
//! that silently drops every notification. Persistence has always already
//! happened by the time the gateway runs; nothing here can fail a request.

use crate::models::{Message, Room};
use crate::websocket::events::ChatEvent;
use crate::websocket::{pubsub, Channel, ConnectionRegistry};
use uuid::Uuid;

pub struct BroadcastGateway {
    registry: Option<ConnectionRegistry>,
    redis: Option<redis::Client>,
}

impl BroadcastGateway {
    pub fn new(registry: Option<ConnectionRegistry>, redis: Option<redis::Client>) -> Self {
        Self { registry, redis }
    }

    /// Gateway with no transport attached; every notification is a no-op.
    pub fn disabled() -> Self {
        Self {
            registry: None,
            redis: None,
        }
    }

    /// Notify the room channel and both participants' personal channels of
    /// a new message. Best-effort; failures are logged and swallowed.
    pub async fn notify_new_message(&self, room: &Room, message: &Message) {
        let mut channels = vec![Channel::Room(room.id), Channel::User(room.owner_id)];
        if room.renter_id != room.owner_id {
            channels.push(Channel::User(room.renter_id));
        }

        let event = ChatEvent::MessageNew {
            message: message.clone(),
        };
        self.dispatch(&channels, &event).await;
    }

    /// Notify the room channel that a viewer caught up. Lets the
    /// counterpart render read state live without polling.
    pub async fn notify_read(&self, room: &Room, reader_id: Uuid) {
        let event = ChatEvent::RoomRead {
            room_id: room.id,
            reader_id,
        };
        self.dispatch(&[Channel::Room(room.id)], &event).await;
    }

    async fn dispatch(&self, channels: &[Channel], event: &ChatEvent) {
        if self.registry.is_none() && self.redis.is_none() {
            return;
        }

        let payload = match event.to_payload() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, event = event.event_type(), "event serialization failed");
                return;
            }
        };

        for &channel in channels {
            // With redis attached, publish only: the pattern subscriber on
            // every instance (this one included) replays into its local
            // registry, so a direct local broadcast would double-deliver.
            if let Some(client) = &self.redis {
                match pubsub::publish(client, channel, &payload).await {
                    Ok(()) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, ?channel, "redis publish failed, falling back to local fanout");
                    }
                }
            }
            if let Some(registry) = &self.registry {
                registry.broadcast(channel, payload.clone()).await;
            }
        }
    }
}
