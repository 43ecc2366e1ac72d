//! Live event payloads pushed over room and user channels.
//!
//! Every event serializes to a flat JSON object with an "object.action"
//! type tag and an RFC 3339 timestamp:
//!
//! ```json
//! {
//!     "type": "message.new",
//!     "timestamp": "2026-08-06T10:30:00Z",
//!     "room_id": "uuid",
//!     ...
//! }
//! ```

use crate::models::Message;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A message was persisted to a room.
    MessageNew { message: Message },
    /// A viewer marked a room read.
    RoomRead { room_id: Uuid, reader_id: Uuid },
}

impl ChatEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageNew { .. } => "message.new",
            Self::RoomRead { .. } => "room.read",
        }
    }

    /// Serialize to the broadcast wire form. This is the only place event
    /// payloads are assembled.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        let value = match self {
            Self::MessageNew { message } => json!({
                "type": self.event_type(),
                "timestamp": Utc::now().to_rfc3339(),
                "room_id": message.room_id,
                "message": message,
            }),
            Self::RoomRead { room_id, reader_id } => json!({
                "type": self.event_type(),
                "timestamp": Utc::now().to_rfc3339(),
                "room_id": room_id,
                "reader_id": reader_id,
            }),
        };
        serde_json::to_string(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_new_payload_is_flat_and_typed() {
        let message = Message {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            body: "Is this available?".to_string(),
            read: false,
            created_at: Utc::now(),
        };
        let payload = ChatEvent::MessageNew {
            message: message.clone(),
        }
        .to_payload()
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "message.new");
        assert_eq!(value["room_id"], json!(message.room_id));
        assert_eq!(value["message"]["body"], "Is this available?");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn room_read_payload_names_the_reader() {
        let room_id = Uuid::new_v4();
        let reader_id = Uuid::new_v4();
        let payload = ChatEvent::RoomRead { room_id, reader_id }.to_payload().unwrap();

        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "room.read");
        assert_eq!(value["reader_id"], json!(reader_id));
    }
}
