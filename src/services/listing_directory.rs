//! Read-only collaborator seam to the marketplace listing catalogue.
//! Rooms only ever need two facts about a listing: who owns it and what
//! to call it in the inbox.

use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait ListingDirectory: Send + Sync {
    /// Resolve the owner of a listing; None when the listing does not exist.
    async fn lookup_owner(&self, listing_id: Uuid) -> Result<Option<Uuid>, AppError>;

    /// Resolve the display title of a listing, if it still exists.
    async fn lookup_title(&self, listing_id: Uuid) -> Result<Option<String>, AppError>;
}

/// Production implementation backed by the `listings` table, which is
/// owned by the listing service; this service only reads it.
pub struct PgListingDirectory {
    db: PgPool,
}

impl PgListingDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingDirectory for PgListingDirectory {
    async fn lookup_owner(&self, listing_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT owner_id FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|(owner_id,)| owner_id))
    }

    async fn lookup_title(&self, listing_id: Uuid) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT title FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|(title,)| title))
    }
}

/// In-memory stand-in used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryListingDirectory {
    listings: std::collections::HashMap<Uuid, (Uuid, String)>,
}

#[cfg(test)]
impl InMemoryListingDirectory {
    pub fn with_listing(mut self, listing_id: Uuid, owner_id: Uuid, title: &str) -> Self {
        self.listings.insert(listing_id, (owner_id, title.to_string()));
        self
    }
}

#[cfg(test)]
#[async_trait]
impl ListingDirectory for InMemoryListingDirectory {
    async fn lookup_owner(&self, listing_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.listings.get(&listing_id).map(|(owner, _)| *owner))
    }

    async fn lookup_title(&self, listing_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.listings.get(&listing_id).map(|(_, title)| title.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_distinguishes_known_from_unknown_listings() {
        let listing = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let dir = InMemoryListingDirectory::default().with_listing(listing, owner, "Loft downtown");

        assert_eq!(dir.lookup_owner(listing).await.unwrap(), Some(owner));
        assert_eq!(
            dir.lookup_title(listing).await.unwrap(),
            Some("Loft downtown".to_string())
        );
        assert_eq!(dir.lookup_owner(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(dir.lookup_title(Uuid::new_v4()).await.unwrap(), None);
    }
}
