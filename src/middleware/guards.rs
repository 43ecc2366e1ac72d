//! Authorization guards that enforce membership checks at the type level
//! This prevents handlers from accidentally bypassing authorization

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::room::{ParticipantRole, Room};

/// Represents an authenticated user forwarded by the platform gateway
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        let user_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .ok_or(AppError::Unauthorized)?;

        Ok(User { id: user_id })
    }
}

/// A verified room participant. Constructing one proves the room exists
/// and the caller is its owner or renter.
#[derive(Debug, Clone)]
pub struct RoomParticipant {
    pub user_id: Uuid,
    pub room: Room,
    pub role: ParticipantRole,
}

impl RoomParticipant {
    /// Factory method performing one query for existence + membership.
    /// Missing room is NotFound before Forbidden so a caller can tell a
    /// dead link from someone else's conversation.
    pub async fn verify(db: &PgPool, user_id: Uuid, room_id: Uuid) -> Result<Self, AppError> {
        let room = sqlx::query_as::<_, Room>(
            "SELECT id, listing_id, owner_id, renter_id, created_at FROM rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)?;

        let role = room.role_of(user_id).ok_or(AppError::Forbidden)?;

        Ok(RoomParticipant {
            user_id,
            room,
            role,
        })
    }

    pub fn counterpart(&self) -> Uuid {
        self.room.counterpart_of(self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_follows_role() {
        let owner = Uuid::new_v4();
        let renter = Uuid::new_v4();
        let room = Room {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            owner_id: owner,
            renter_id: renter,
            created_at: chrono::Utc::now(),
        };

        let participant = RoomParticipant {
            user_id: owner,
            room: room.clone(),
            role: ParticipantRole::Owner,
        };
        assert_eq!(participant.counterpart(), renter);

        let participant = RoomParticipant {
            user_id: renter,
            room,
            role: ParticipantRole::Renter,
        };
        assert_eq!(participant.counterpart(), owner);
    }
}
