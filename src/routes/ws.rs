use crate::middleware::guards::{RoomParticipant, User};
use crate::state::AppState;
use crate::websocket::{Channel, ConnectionRegistry};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Subscribe to this room's channel (participants only). Without it
    /// the socket subscribes to the caller's personal channel instead.
    pub room_id: Option<Uuid>,
}

/// GET /ws?room_id=
pub async fn ws_handler(
    State(state): State<AppState>,
    user: User,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, crate::error::AppError> {
    let channel = match params.room_id {
        Some(room_id) => {
            RoomParticipant::verify(&state.db, user.id, room_id).await?;
            Channel::Room(room_id)
        }
        None => Channel::User(user.id),
    };

    let registry = state.registry.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, registry, channel)))
}

async fn handle_socket(socket: WebSocket, registry: ConnectionRegistry, channel: Channel) {
    let (subscriber_id, mut rx) = registry.add_subscriber(channel).await;
    let (mut sink, mut stream) = socket.split();

    // Pump broadcast payloads out to the socket until either side dies
    let mut forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // The inbound side only keeps the connection alive: all writes go
    // through the HTTP API, so frames other than Close are drained.
    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = &mut forward => break,
        }
    }

    forward.abort();
    registry.remove_subscriber(channel, subscriber_id).await;
    tracing::debug!(?channel, "websocket closed");
}
