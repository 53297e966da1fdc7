//! PostgreSQL-backed `FriendshipRepository` using Diesel ORM.
//!
//! Edges are directed rows keyed on `(user_id, friend_id)`. Accepting a
//! request flips the incoming edge and writes its mirror in one transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{FriendshipRepository, FriendshipRepositoryError};
use crate::domain::{Friendship, FriendshipStatus, UserId, UserSummary};

use super::conversions::row_to_summary;
use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{FriendshipRow, NewFriendshipRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{friendships, users};

const PENDING: &str = FriendshipStatus::Pending.as_str();
const ACCEPTED: &str = FriendshipStatus::Accepted.as_str();

/// Diesel-backed implementation of the `FriendshipRepository` port.
#[derive(Clone)]
pub struct DieselFriendshipRepository {
    pool: DbPool,
}

impl DieselFriendshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn summaries(&self, ids: Vec<Uuid>) -> Result<Vec<UserSummary>, FriendshipRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids))
            .order_by(users::email)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| row_to_summary(row).map_err(FriendshipRepositoryError::query))
            .collect()
    }
}

fn map_pool_error(error: PoolError) -> FriendshipRepositoryError {
    map_basic_pool_error(error, FriendshipRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FriendshipRepositoryError {
    map_basic_diesel_error(
        error,
        FriendshipRepositoryError::query,
        FriendshipRepositoryError::connection,
    )
}

fn row_to_friendship(row: FriendshipRow) -> Result<Friendship, FriendshipRepositoryError> {
    let status = row
        .status
        .parse::<FriendshipStatus>()
        .map_err(|err| FriendshipRepositoryError::query(err.to_string()))?;
    Ok(Friendship {
        user_id: UserId::from_uuid(row.user_id),
        friend_id: UserId::from_uuid(row.friend_id),
        status,
        requested_by: UserId::from_uuid(row.requested_by),
    })
}

#[async_trait]
impl FriendshipRepository for DieselFriendshipRepository {
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (a, b) = (*a.as_uuid(), *b.as_uuid());
        let rows: Vec<FriendshipRow> = friendships::table
            .filter(
                friendships::user_id
                    .eq(a)
                    .and(friendships::friend_id.eq(b))
                    .or(friendships::user_id.eq(b).and(friendships::friend_id.eq(a))),
            )
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let preferred = rows.iter().position(|row| row.user_id == a).unwrap_or(0);
        rows.into_iter()
            .nth(preferred)
            .map(row_to_friendship)
            .transpose()
    }

    async fn insert_pending(
        &self,
        requester: &UserId,
        target: &UserId,
    ) -> Result<bool, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewFriendshipRow {
            user_id: *requester.as_uuid(),
            friend_id: *target.as_uuid(),
            status: PENDING,
            requested_by: *requester.as_uuid(),
        };
        let inserted = diesel::insert_into(friendships::table)
            .values(&row)
            .on_conflict((friendships::user_id, friendships::friend_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn accept(&self, me: &UserId, friend: &UserId) -> Result<bool, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (me, friend) = (*me.as_uuid(), *friend.as_uuid());
        conn.transaction(|conn| {
            async move {
                let flipped = diesel::update(
                    friendships::table
                        .find((friend, me))
                        .filter(friendships::status.eq(PENDING)),
                )
                .set(friendships::status.eq(ACCEPTED))
                .execute(conn)
                .await?;
                if flipped == 0 {
                    return Ok(false);
                }
                let mirror = NewFriendshipRow {
                    user_id: me,
                    friend_id: friend,
                    status: ACCEPTED,
                    requested_by: friend,
                };
                diesel::insert_into(friendships::table)
                    .values(&mirror)
                    .on_conflict((friendships::user_id, friendships::friend_id))
                    .do_update()
                    .set(friendships::status.eq(ACCEPTED))
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_friends(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserSummary>, FriendshipRepositoryError> {
        let ids = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let me = *me.as_uuid();
            let rows: Vec<FriendshipRow> = friendships::table
                .filter(friendships::status.eq(ACCEPTED))
                .filter(friendships::user_id.eq(me).or(friendships::friend_id.eq(me)))
                .select(FriendshipRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let mut ids: Vec<Uuid> = rows
                .into_iter()
                .map(|row| if row.user_id == me { row.friend_id } else { row.user_id })
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        self.summaries(ids).await
    }

    async fn list_incoming(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserSummary>, FriendshipRepositoryError> {
        let ids = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            friendships::table
                .filter(friendships::friend_id.eq(me.as_uuid()))
                .filter(friendships::status.eq(PENDING))
                .select(friendships::user_id)
                .load::<Uuid>(&mut conn)
                .await
                .map_err(map_diesel_error)?
        };
        self.summaries(ids).await
    }

    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendshipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (a, b) = (*a.as_uuid(), *b.as_uuid());
        let count: i64 = friendships::table
            .filter(friendships::status.eq(ACCEPTED))
            .filter(
                friendships::user_id
                    .eq(a)
                    .and(friendships::friend_id.eq(b))
                    .or(friendships::user_id.eq(b).and(friendships::friend_id.eq(a))),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(count > 0)
    }
}
