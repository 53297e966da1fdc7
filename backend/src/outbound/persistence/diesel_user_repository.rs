//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Users are keyed by the identity provider subject. Sign-in upserts on
//! `external_id`, so concurrent first logins for one subject converge on a
//! single row.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, ExternalSubject, ProfileUpdate, User, UserId};

use super::conversions::row_to_user;
use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error, unique_violation};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const HANDLE_CONSTRAINT: &str = "users_handle_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_user(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert_by_subject(
        &self,
        subject: &ExternalSubject,
        email: &Email,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            external_id: subject.as_str(),
            email: email.as_str(),
        };

        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::external_id)
            .do_update()
            .set(users::external_id.eq(users::external_id))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(EMAIL_CONSTRAINT) => UserPersistenceError::email_taken(email.as_str()),
                _ => map_diesel_error(err),
            })?;
        to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserProfileChangeset {
            handle: update.handle.as_ref().map(|h| h.as_str()),
            bio: update.bio.as_ref().map(|b| b.as_str()),
            avatar_key: update.avatar_key.as_deref(),
            updated_at: chrono::Utc::now(),
        };
        diesel::update(users::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| match (unique_violation(&err), &update.handle) {
                (Some(HANDLE_CONSTRAINT), Some(handle)) => {
                    UserPersistenceError::handle_taken(handle.as_str())
                }
                _ => map_diesel_error(err),
            })?
            .map(to_user)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Error-mapping coverage; query behaviour is exercised against
    //! PostgreSQL in deployment smoke tests.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let mapped = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(mapped, UserPersistenceError::Connection { .. }));
        assert!(mapped.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let mapped = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(mapped, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn invalid_stored_email_is_a_query_error() {
        let row = UserRow {
            id: Uuid::nil(),
            external_id: "sub".to_owned(),
            email: "not-an-email".to_owned(),
            handle: None,
            bio: None,
            avatar_key: None,
        };
        let err = to_user(row).expect_err("invalid email");
        assert!(err.to_string().contains("invalid email"));
    }
}
