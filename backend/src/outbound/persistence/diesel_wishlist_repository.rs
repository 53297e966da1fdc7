//! PostgreSQL-backed `WishlistRepository` using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{WishlistRepository, WishlistRepositoryError};
use crate::domain::{Note, PlaceId, UserId, WishlistEntry};

use super::conversions::{row_to_place, stored_note};
use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewWishlistRow, PlaceRow, WishlistRow};
use super::pool::{DbPool, PoolError};
use super::schema::{places, wishlists};

/// Diesel-backed implementation of the `WishlistRepository` port.
#[derive(Clone)]
pub struct DieselWishlistRepository {
    pool: DbPool,
}

impl DieselWishlistRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WishlistRepositoryError {
    map_basic_pool_error(error, WishlistRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WishlistRepositoryError {
    map_basic_diesel_error(
        error,
        WishlistRepositoryError::query,
        WishlistRepositoryError::connection,
    )
}

fn to_entry((row, place): (WishlistRow, PlaceRow)) -> Result<WishlistEntry, WishlistRepositoryError> {
    Ok(WishlistEntry {
        user_id: UserId::from_uuid(row.user_id),
        place: row_to_place(place).map_err(WishlistRepositoryError::query)?,
        note: stored_note(row.note).map_err(WishlistRepositoryError::query)?,
        saved_at: row.saved_at,
    })
}

async fn load_entry(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
    place_id: &PlaceId,
) -> Result<Option<(WishlistRow, PlaceRow)>, diesel::result::Error> {
    wishlists::table
        .inner_join(places::table)
        .filter(wishlists::user_id.eq(user_id.as_uuid()))
        .filter(wishlists::place_id.eq(place_id.as_uuid()))
        .select((WishlistRow::as_select(), PlaceRow::as_select()))
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl WishlistRepository for DieselWishlistRepository {
    async fn save(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
        saved_at: DateTime<Utc>,
    ) -> Result<WishlistEntry, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewWishlistRow {
            user_id: *user_id.as_uuid(),
            place_id: *place_id.as_uuid(),
            note: note.as_ref().map(Note::as_str),
            saved_at,
        };
        let stored = conn
            .transaction(|conn| {
                async move {
                    let inserted = diesel::insert_into(wishlists::table)
                        .values(&new_row)
                        .on_conflict((wishlists::user_id, wishlists::place_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0
                        && let Some(text) = new_row.note
                    {
                        diesel::update(wishlists::table.find((new_row.user_id, new_row.place_id)))
                            .set(wishlists::note.eq(text))
                            .execute(conn)
                            .await?;
                    }
                    load_entry(conn, user_id, place_id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        stored
            .map(to_entry)
            .transpose()?
            .ok_or_else(|| WishlistRepositoryError::query("saved wishlist entry vanished"))
    }

    async fn list(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(WishlistRow, PlaceRow)> = wishlists::table
            .inner_join(places::table)
            .filter(wishlists::user_id.eq(user_id.as_uuid()))
            .order_by(wishlists::saved_at.desc())
            .select((WishlistRow::as_select(), PlaceRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_entry).collect()
    }

    async fn find(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_entry(&mut conn, user_id, place_id)
            .await
            .map_err(map_diesel_error)?
            .map(to_entry)
            .transpose()
    }

    async fn set_note(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
        note: Option<Note>,
    ) -> Result<Option<WishlistEntry>, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(wishlists::table.find((user_id.as_uuid(), place_id.as_uuid())))
            .set(wishlists::note.eq(note.as_ref().map(Note::as_str)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_entry(&mut conn, user_id, place_id)
            .await
            .map_err(map_diesel_error)?
            .map(to_entry)
            .transpose()
    }

    async fn delete(
        &self,
        user_id: &UserId,
        place_id: &PlaceId,
    ) -> Result<bool, WishlistRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(wishlists::table.find((user_id.as_uuid(), place_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
