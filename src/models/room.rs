use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One conversation context between a listing's owner and a renter.
/// At most one row may exist per (listing_id, renter_id); the database
/// uniqueness constraint is the authority, not application logic.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub renter_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Owner,
    Renter,
}

impl Room {
    /// Resolves the caller's role, or None for a non-participant.
    pub fn role_of(&self, user_id: Uuid) -> Option<ParticipantRole> {
        if self.owner_id == user_id {
            Some(ParticipantRole::Owner)
        } else if self.renter_id == user_id {
            Some(ParticipantRole::Renter)
        } else {
            None
        }
    }

    /// The other participant relative to `user_id`. Only meaningful for a
    /// participant; for the owner-is-renter self-room both sides collapse
    /// to the same identity.
    pub fn counterpart_of(&self, user_id: Uuid) -> Uuid {
        if self.owner_id == user_id {
            self.renter_id
        } else {
            self.owner_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(owner: Uuid, renter: Uuid) -> Room {
        Room {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            owner_id: owner,
            renter_id: renter,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn role_of_resolves_both_participants() {
        let owner = Uuid::new_v4();
        let renter = Uuid::new_v4();
        let r = room(owner, renter);

        assert_eq!(r.role_of(owner), Some(ParticipantRole::Owner));
        assert_eq!(r.role_of(renter), Some(ParticipantRole::Renter));
        assert_eq!(r.role_of(Uuid::new_v4()), None);
    }

    #[test]
    fn counterpart_is_the_other_side() {
        let owner = Uuid::new_v4();
        let renter = Uuid::new_v4();
        let r = room(owner, renter);

        assert_eq!(r.counterpart_of(owner), renter);
        assert_eq!(r.counterpart_of(renter), owner);
    }
}
