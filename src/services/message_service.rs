use crate::error::AppError;
use crate::models::{Message, Room};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// One page of history, oldest first so clients can append directly.
#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

pub struct MessageService;

impl MessageService {
    /// Persist a new message. The sender must be a participant of `room`;
    /// the body must be non-empty after trimming and within the length cap.
    pub async fn post_message(
        db: &PgPool,
        room: &Room,
        sender_id: Uuid,
        body: &str,
        max_chars: usize,
    ) -> Result<Message, AppError> {
        if room.role_of(sender_id).is_none() {
            return Err(AppError::Forbidden);
        }
        let body = Self::validate_body(body, max_chars)?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, room_id, sender_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, room_id, sender_id, body, read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(room.id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(db)
        .await?;

        Ok(message)
    }

    /// Fetch up to `limit` messages strictly older than `before` (when
    /// given), returned in ascending order. Walking backwards with the
    /// oldest timestamp of each page is a restartable cursor as long as
    /// timestamps in a room are distinct; a collision at a page boundary
    /// may skip or repeat one message.
    pub async fn get_messages(
        db: &PgPool,
        room_id: Uuid,
        limit: Option<i64>,
        before: Option<DateTime<Utc>>,
    ) -> Result<MessagePage, AppError> {
        let limit = Self::normalize_limit(limit);

        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, room_id, sender_id, body, read, created_at
            FROM messages
            WHERE room_id = $1
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(room_id)
        .bind(before)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(Self::page_from_newest(rows, limit))
    }

    /// Flip every unread message from the counterpart to read. Idempotent;
    /// returns the number of rows flipped.
    pub async fn mark_read(db: &PgPool, room_id: Uuid, viewer_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE
             WHERE room_id = $1 AND sender_id <> $2 AND NOT read",
        )
        .bind(room_id)
        .bind(viewer_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Derived count of counterpart messages the viewer has not read.
    pub async fn unread_count(
        db: &PgPool,
        room_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages
             WHERE room_id = $1 AND sender_id <> $2 AND NOT read",
        )
        .bind(room_id)
        .bind(viewer_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    fn validate_body(body: &str, max_chars: usize) -> Result<&str, AppError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("message body cannot be empty".into()));
        }
        if trimmed.chars().count() > max_chars {
            return Err(AppError::BadRequest(format!(
                "message body exceeds {max_chars} characters"
            )));
        }
        Ok(trimmed)
    }

    fn normalize_limit(limit: Option<i64>) -> i64 {
        match limit {
            Some(n) if n > 0 => n.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// Rows arrive newest-first from the store; the page is served oldest
    /// first. A full page signals another page may exist. The flag is
    /// approximate on purpose: when the remainder is exactly `limit` it
    /// stays true and the next fetch comes back empty.
    fn page_from_newest(mut rows: Vec<Message>, limit: i64) -> MessagePage {
        let has_more = rows.len() as i64 == limit;
        rows.reverse();
        MessagePage {
            messages: rows,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message_at(room_id: Uuid, secs: i64) -> Message {
        Message {
            id: Uuid::new_v4(),
            room_id,
            sender_id: Uuid::new_v4(),
            body: format!("m{secs}"),
            read: false,
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn lazy_pool() -> PgPool {
        // Never connects; both rejection paths below fail before any I/O.
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    fn room_between(owner: Uuid, renter: Uuid) -> Room {
        Room {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            owner_id: owner,
            renter_id: renter,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn non_participant_post_is_rejected_without_persisting() {
        let room = room_between(Uuid::new_v4(), Uuid::new_v4());
        let outsider = Uuid::new_v4();

        let err = MessageService::post_message(&lazy_pool(), &room, outsider, "hi", 2000)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn blank_post_is_rejected_without_persisting() {
        let owner = Uuid::new_v4();
        let room = room_between(owner, Uuid::new_v4());

        let err = MessageService::post_message(&lazy_pool(), &room, owner, "   ", 2000)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn body_must_be_non_empty_after_trim() {
        assert!(matches!(
            MessageService::validate_body("", 2000),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            MessageService::validate_body("   \n\t ", 2000),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn body_is_trimmed_and_length_capped() {
        assert_eq!(
            MessageService::validate_body("  hello  ", 2000).unwrap(),
            "hello"
        );
        let long = "x".repeat(2001);
        assert!(matches!(
            MessageService::validate_body(&long, 2000),
            Err(AppError::BadRequest(_))
        ));
        let exact = "x".repeat(2000);
        assert!(MessageService::validate_body(&exact, 2000).is_ok());
    }

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(MessageService::normalize_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(MessageService::normalize_limit(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(MessageService::normalize_limit(Some(-5)), DEFAULT_PAGE_SIZE);
        assert_eq!(MessageService::normalize_limit(Some(20)), 20);
        assert_eq!(MessageService::normalize_limit(Some(10_000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_is_served_oldest_first() {
        let room_id = Uuid::new_v4();
        // store order: newest first
        let rows = vec![
            message_at(room_id, 50),
            message_at(room_id, 40),
            message_at(room_id, 30),
        ];
        let page = MessageService::page_from_newest(rows, 50);

        let times: Vec<i64> = page
            .messages
            .iter()
            .map(|m| m.created_at.timestamp())
            .collect();
        assert_eq!(times, vec![30, 40, 50]);
        assert!(!page.has_more);
    }

    #[test]
    fn full_page_signals_more() {
        let room_id = Uuid::new_v4();
        let rows = vec![message_at(room_id, 50), message_at(room_id, 40)];
        let page = MessageService::page_from_newest(rows, 2);
        assert!(page.has_more);
    }

    #[test]
    fn cursor_walk_reconstructs_history_without_gaps() {
        // Simulate the store for messages at t1..t5 and limit 2: the walk
        // should produce [t4,t5] more, [t2,t3] more, [t1] done.
        let room_id = Uuid::new_v4();
        let all: Vec<Message> = (1..=5).map(|s| message_at(room_id, s)).collect();
        let limit = 2i64;

        let fetch = |before: Option<DateTime<Utc>>| -> Vec<Message> {
            let mut rows: Vec<Message> = all
                .iter()
                .filter(|m| before.map(|b| m.created_at < b).unwrap_or(true))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(limit as usize);
            rows
        };

        let mut collected = Vec::new();
        let mut before = None;
        loop {
            let page = MessageService::page_from_newest(fetch(before), limit);
            if page.messages.is_empty() {
                break;
            }
            before = Some(page.messages[0].created_at);
            let more = page.has_more;
            collected.splice(0..0, page.messages);
            if !more {
                break;
            }
        }

        let times: Vec<i64> = collected.iter().map(|m| m.created_at.timestamp()).collect();
        assert_eq!(times, vec![1, 2, 3, 4, 5]);
    }
}
