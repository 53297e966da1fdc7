//! Wishlist domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    PlaceRepository, PlaceRepositoryError, SaveWishlistRequest, WishlistCommand, WishlistQuery,
    WishlistRepository, WishlistRepositoryError,
};
use crate::domain::{Error, Note, PlaceId, UserId, WishlistEntry};

/// Implements the wishlist driving ports.
pub struct WishlistService<P, W> {
    places: Arc<P>,
    wishlists: Arc<W>,
    clock: Arc<dyn Clock>,
}

impl<P, W> WishlistService<P, W> {
    pub fn new(places: Arc<P>, wishlists: Arc<W>, clock: Arc<dyn Clock>) -> Self {
        Self {
            places,
            wishlists,
            clock,
        }
    }
}

fn map_place_error(error: PlaceRepositoryError) -> Error {
    match error {
        PlaceRepositoryError::Connection { message } => {
            Error::internal(format!("place repository unavailable: {message}"))
        }
        PlaceRepositoryError::Query { message } => {
            Error::internal(format!("place repository error: {message}"))
        }
    }
}

fn map_wishlist_error(error: WishlistRepositoryError) -> Error {
    match error {
        WishlistRepositoryError::Connection { message } => {
            Error::internal(format!("wishlist repository unavailable: {message}"))
        }
        WishlistRepositoryError::Query { message } => {
            Error::internal(format!("wishlist repository error: {message}"))
        }
    }
}

fn not_saved() -> Error {
    Error::not_found("place is not in your wishlist")
}

#[async_trait]
impl<P, W> WishlistCommand for WishlistService<P, W>
where
    P: PlaceRepository,
    W: WishlistRepository,
{
    async fn save(&self, request: SaveWishlistRequest) -> Result<WishlistEntry, Error> {
        let draft = request
            .place
            .normalised()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let place = self
            .places
            .upsert(&draft)
            .await
            .map_err(map_place_error)?;
        self.wishlists
            .save(&request.user_id, &place.id, request.note, self.clock.utc())
            .await
            .map_err(map_wishlist_error)
    }

    async fn update_note(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
    ) -> Result<WishlistEntry, Error> {
        self.wishlists
            .set_note(user_id, place_id, note)
            .await
            .map_err(map_wishlist_error)?
            .ok_or_else(not_saved)
    }

    async fn remove(&self, user_id: &UserId, place_id: &PlaceId) -> Result<bool, Error> {
        self.wishlists
            .delete(user_id, place_id)
            .await
            .map_err(map_wishlist_error)
    }
}

#[async_trait]
impl<P, W> WishlistQuery for WishlistService<P, W>
where
    P: PlaceRepository,
    W: WishlistRepository,
{
    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, Error> {
        self.wishlists
            .list(user_id)
            .await
            .map_err(map_wishlist_error)
    }

    async fn get(&self, user_id: &UserId, place_id: &PlaceId) -> Result<WishlistEntry, Error> {
        self.wishlists
            .find(user_id, place_id)
            .await
            .map_err(map_wishlist_error)?
            .ok_or_else(not_saved)
    }
}
