use crate::middleware::guards::{RoomParticipant, User};
use crate::models::Message;
use crate::services::message_service::{MessagePage, MessageService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// POST /rooms/:id/messages
pub async fn send_message(
    State(state): State<AppState>,
    user: User,
    Path(room_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), crate::error::AppError> {
    let participant = RoomParticipant::verify(&state.db, user.id, room_id).await?;

    let message = MessageService::post_message(
        &state.db,
        &participant.room,
        user.id,
        &request.body,
        state.config.max_message_chars,
    )
    .await?;

    // Fanout happens after the row is durable and never delays or fails
    // the response.
    let gateway = state.gateway.clone();
    let room = participant.room.clone();
    let stored = message.clone();
    tokio::spawn(async move {
        gateway.notify_new_message(&room, &stored).await;
    });

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Parsed leniently: anything that is not a positive integer falls
    /// back to the default page size.
    pub limit: Option<String>,
    pub before: Option<DateTime<Utc>>,
}

/// GET /rooms/:id/messages?limit=&before=
/// Cursor pagination, newest page first; pass the oldest timestamp of the
/// previous page as `before` to walk backwards through history.
pub async fn get_messages(
    State(state): State<AppState>,
    user: User,
    Path(room_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<MessagePage>, crate::error::AppError> {
    RoomParticipant::verify(&state.db, user.id, room_id).await?;

    let limit = query.limit.and_then(|s| s.parse::<i64>().ok());
    let page = MessageService::get_messages(&state.db, room_id, limit, query.before).await?;

    Ok(Json(page))
}
