//! Port for per-user wishlists.
//!
//! Entries are unique per (user, place); saving an already saved place
//! touches the existing row rather than adding another.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Note, PlaceId, UserId, WishlistEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by wishlist repository adapters.
    pub enum WishlistRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "wishlist repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "wishlist repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Upsert the entry for (user, place). A `Some` note replaces the stored
    /// note; `None` keeps it. The original save time is kept on conflict.
    async fn save(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
        saved_at: DateTime<Utc>,
    ) -> Result<WishlistEntry, WishlistRepositoryError>;

    /// List a user's entries, most recently saved first.
    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, WishlistRepositoryError>;

    /// Fetch one entry.
    async fn find(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError>;

    /// Overwrite the note of an existing entry; `None` clears it. Returns the
    /// updated entry or `None` when the entry does not exist.
    async fn set_note(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError>;

    /// Delete an entry, reporting whether a row was removed.
    async fn delete(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<bool, WishlistRepositoryError>;
}
