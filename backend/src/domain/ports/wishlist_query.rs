//! Driving port for reading a wishlist.

use async_trait::async_trait;

use crate::domain::{Error, PlaceId, UserId, WishlistEntry};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistQuery: Send + Sync {
    /// The caller's entries, most recently saved first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, Error>;

    /// One entry; not found when the place is not saved.
    async fn get(&self, user_id: &UserId, place_id: &PlaceId) -> Result<WishlistEntry, Error>;
}
