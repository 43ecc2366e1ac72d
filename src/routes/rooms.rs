use crate::middleware::guards::{RoomParticipant, User};
use crate::models::Room;
use crate::services::message_service::MessageService;
use crate::services::room_list_service::{RoleFilter, RoomListEntry, RoomListService};
use crate::services::room_service::RoomService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct EnsureRoomRequest {
    pub listing_id: Uuid,
}

#[derive(Serialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub renter_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            listing_id: room.listing_id,
            owner_id: room.owner_id,
            renter_id: room.renter_id,
            created_at: room.created_at,
        }
    }
}

/// POST /rooms
/// First contact between the caller (as renter) and a listing's owner.
/// Returns the existing room when one is already there.
pub async fn ensure_room(
    State(state): State<AppState>,
    user: User,
    Json(body): Json<EnsureRoomRequest>,
) -> Result<Json<RoomResponse>, crate::error::AppError> {
    let room = RoomService::ensure_room(
        &state.db,
        state.listings.as_ref(),
        body.listing_id,
        user.id,
    )
    .await?;

    Ok(Json(room.into()))
}

#[derive(Deserialize)]
pub struct ListRoomsQuery {
    pub role: Option<String>,
}

/// GET /rooms?role=all|renter|owner
/// The caller's inbox: deduplicated rooms with last message + unread count.
pub async fn list_rooms(
    State(state): State<AppState>,
    user: User,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<Vec<RoomListEntry>>, crate::error::AppError> {
    let filter = match query.role.as_deref() {
        Some(value) => value.parse::<RoleFilter>()?,
        None => RoleFilter::default(),
    };

    let entries =
        RoomListService::list_rooms(&state.db, state.listings.as_ref(), user.id, filter).await?;

    Ok(Json(entries))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub room_id: Uuid,
    pub unread: i64,
}

/// GET /rooms/:id/unread
/// Unread badge for a single room without fetching the whole inbox.
pub async fn unread_count(
    State(state): State<AppState>,
    user: User,
    Path(room_id): Path<Uuid>,
) -> Result<Json<UnreadCountResponse>, crate::error::AppError> {
    RoomParticipant::verify(&state.db, user.id, room_id).await?;

    let unread = MessageService::unread_count(&state.db, room_id, user.id).await?;

    Ok(Json(UnreadCountResponse { room_id, unread }))
}

/// POST /rooms/:id/read
/// Mark every counterpart message in the room as read.
pub async fn mark_as_read(
    State(state): State<AppState>,
    user: User,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, crate::error::AppError> {
    let participant = RoomParticipant::verify(&state.db, user.id, room_id).await?;

    MessageService::mark_read(&state.db, room_id, user.id).await?;

    // Read receipt fanout is best-effort and must not hold up the response
    let gateway = state.gateway.clone();
    let room = participant.room.clone();
    let reader_id = user.id;
    tokio::spawn(async move {
        gateway.notify_read(&room, reader_id).await;
    });

    Ok(StatusCode::NO_CONTENT)
}
