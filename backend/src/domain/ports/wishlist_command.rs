//! Driving port for editing a wishlist.

use async_trait::async_trait;

use crate::domain::{Error, Note, PlaceDraft, PlaceId, UserId, WishlistEntry};

/// Request to save a place to the caller's wishlist.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveWishlistRequest {
    pub user_id: UserId,
    pub place: PlaceDraft,
    /// Replaces the stored note when present.
    pub note: Option<Note>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistCommand: Send + Sync {
    /// Upsert the place and the wishlist entry. Saving twice keeps one entry.
    async fn save(&self, request: SaveWishlistRequest) -> Result<WishlistEntry, Error>;

    /// Replace or clear the note of a saved place.
    async fn update_note(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
    ) -> Result<WishlistEntry, Error>;

    /// Remove a saved place, reporting whether anything was removed.
    async fn remove(&self, user_id: &UserId, place_id: &PlaceId) -> Result<bool, Error>;
}
