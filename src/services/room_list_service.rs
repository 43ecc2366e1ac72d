//! Inbox assembly: every room a viewer participates in, annotated with
//! the most recent message and unread count, collapsed so a (listing,
//! counterpart) pair never shows up twice.

use crate::error::AppError;
use crate::services::listing_directory::ListingDirectory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Which side of the conversation the viewer must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Renter,
    Owner,
}

impl FromStr for RoleFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(RoleFilter::All),
            "renter" => Ok(RoleFilter::Renter),
            "owner" => Ok(RoleFilter::Owner),
            other => Err(AppError::BadRequest(format!(
                "invalid role filter: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LastMessage {
    pub body: String,
    pub sender_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomListEntry {
    pub room_id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: Option<String>,
    pub owner_id: Uuid,
    pub renter_id: Uuid,
    pub counterpart_id: Uuid,
    pub last_message: Option<LastMessage>,
    pub unread_count: i64,
}

#[derive(sqlx::FromRow)]
struct RoomListRow {
    id: Uuid,
    listing_id: Uuid,
    owner_id: Uuid,
    renter_id: Uuid,
    last_body: Option<String>,
    last_sender_id: Option<Uuid>,
    last_created_at: Option<DateTime<Utc>>,
    unread_count: i64,
}

pub struct RoomListService;

impl RoomListService {
    pub async fn list_rooms(
        db: &PgPool,
        listings: &dyn ListingDirectory,
        viewer_id: Uuid,
        filter: RoleFilter,
    ) -> Result<Vec<RoomListEntry>, AppError> {
        let role_clause = match filter {
            RoleFilter::All => "(r.owner_id = $1 OR r.renter_id = $1)",
            RoleFilter::Renter => "r.renter_id = $1",
            RoleFilter::Owner => "r.owner_id = $1",
        };

        // Last message via LATERAL, unread as a correlated count; both ride
        // the (room_id, created_at DESC) index.
        let query_sql = format!(
            r#"
            SELECT r.id, r.listing_id, r.owner_id, r.renter_id,
                   lm.body AS last_body,
                   lm.sender_id AS last_sender_id,
                   lm.created_at AS last_created_at,
                   (SELECT COUNT(*) FROM messages m
                     WHERE m.room_id = r.id AND m.sender_id <> $1 AND NOT m.read) AS unread_count
            FROM rooms r
            LEFT JOIN LATERAL (
                SELECT body, sender_id, created_at
                FROM messages m
                WHERE m.room_id = r.id
                ORDER BY m.created_at DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE {role_clause}
            "#
        );

        let rows = sqlx::query_as::<_, RoomListRow>(&query_sql)
            .bind(viewer_id)
            .fetch_all(db)
            .await?;

        let mut titles: HashMap<Uuid, Option<String>> = HashMap::new();
        for row in &rows {
            if !titles.contains_key(&row.listing_id) {
                let title = listings.lookup_title(row.listing_id).await?;
                titles.insert(row.listing_id, title);
            }
        }

        let entries = rows
            .into_iter()
            .map(|row| {
                let counterpart_id = if row.owner_id == viewer_id {
                    row.renter_id
                } else {
                    row.owner_id
                };
                let last_message = match (row.last_body, row.last_sender_id, row.last_created_at) {
                    (Some(body), Some(sender_id), Some(created_at)) => Some(LastMessage {
                        body,
                        sender_id,
                        created_at,
                    }),
                    _ => None,
                };
                RoomListEntry {
                    room_id: row.id,
                    listing_id: row.listing_id,
                    listing_title: titles.get(&row.listing_id).cloned().flatten(),
                    owner_id: row.owner_id,
                    renter_id: row.renter_id,
                    counterpart_id,
                    last_message,
                    unread_count: row.unread_count,
                }
            })
            .collect();

        Ok(Self::dedupe_and_sort(entries))
    }

    /// Collapse rooms that represent the same logical conversation, i.e.
    /// the same (listing, counterpart) pair, keeping the most recently
    /// active one, then order by last activity descending. Rooms without
    /// messages lose every dedup tie and sort to the end.
    fn dedupe_and_sort(entries: Vec<RoomListEntry>) -> Vec<RoomListEntry> {
        let mut best: HashMap<(Uuid, Uuid), RoomListEntry> = HashMap::new();
        for entry in entries {
            let key = (entry.listing_id, entry.counterpart_id);
            match best.get(&key) {
                Some(current) if Self::last_activity(current) >= Self::last_activity(&entry) => {}
                _ => {
                    best.insert(key, entry);
                }
            }
        }

        let mut out: Vec<RoomListEntry> = best.into_values().collect();
        out.sort_by(|a, b| Self::last_activity(b).cmp(&Self::last_activity(a)));
        out
    }

    fn last_activity(entry: &RoomListEntry) -> Option<DateTime<Utc>> {
        entry.last_message.as_ref().map(|m| m.created_at)
    }
}
