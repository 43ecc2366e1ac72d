use crate::error::AppError;
use crate::models::Room;
use crate::services::listing_directory::ListingDirectory;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RoomService;

impl RoomService {
    /// Return the room for (listing, renter), creating it on first contact.
    ///
    /// Creation races with itself when the same renter fires two requests
    /// for the same listing: the UNIQUE (listing_id, renter_id) constraint
    /// decides the winner, the loser's insert comes back empty and we fall
    /// back to reading the winner's row. The conflict never surfaces.
    pub async fn ensure_room(
        db: &PgPool,
        listings: &dyn ListingDirectory,
        listing_id: Uuid,
        renter_id: Uuid,
    ) -> Result<Room, AppError> {
        if let Some(room) = Self::find_room(db, listing_id, renter_id).await? {
            return Ok(room);
        }

        let owner_id = listings
            .lookup_owner(listing_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let inserted = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (id, listing_id, owner_id, renter_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (listing_id, renter_id) DO NOTHING
            RETURNING id, listing_id, owner_id, renter_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(owner_id)
        .bind(renter_id)
        .fetch_optional(db)
        .await?;

        match inserted {
            Some(room) => {
                tracing::info!(room_id = %room.id, listing_id = %listing_id, "room created");
                Ok(room)
            }
            None => {
                // Lost the creation race; the winner's row is authoritative.
                let conflict =
                    AppError::Conflict(format!("room exists for listing {listing_id}"));
                tracing::debug!(error = %conflict, "recovering via lookup");
                Self::find_room(db, listing_id, renter_id)
                    .await?
                    .ok_or(AppError::Internal)
            }
        }
    }

    pub async fn find_room(
        db: &PgPool,
        listing_id: Uuid,
        renter_id: Uuid,
    ) -> Result<Option<Room>, AppError> {
        let room = sqlx::query_as::<_, Room>(
            "SELECT id, listing_id, owner_id, renter_id, created_at
             FROM rooms WHERE listing_id = $1 AND renter_id = $2",
        )
        .bind(listing_id)
        .bind(renter_id)
        .fetch_optional(db)
        .await?;

        Ok(room)
    }
}
