//! PostgreSQL-backed `InviteRepository` using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{InviteRepository, InviteRepositoryError};
use crate::domain::{
    Email, Invite, InviteRole, InviteToken, MemberStatus, ProjectId, ProjectRole, UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{InviteRow, NewInviteRow, NewMemberRow};
use super::pool::{DbPool, PoolError};
use super::schema::{project_invites, project_members};

/// Diesel-backed implementation of the `InviteRepository` port.
#[derive(Clone)]
pub struct DieselInviteRepository {
    pool: DbPool,
}

impl DieselInviteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InviteRepositoryError {
    map_basic_pool_error(error, InviteRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> InviteRepositoryError {
    map_basic_diesel_error(
        error,
        InviteRepositoryError::query,
        InviteRepositoryError::connection,
    )
}

fn row_to_invite(row: InviteRow) -> Result<Invite, InviteRepositoryError> {
    let token = InviteToken::new(&row.token)
        .map_err(|err| InviteRepositoryError::query(format!("stored invite token: {err}")))?;
    let email = Email::new(&row.email)
        .map_err(|err| InviteRepositoryError::query(format!("stored invite email: {err}")))?;
    Ok(Invite {
        project_id: ProjectId::from_uuid(row.project_id),
        email,
        token,
        role: InviteRole::from_storage(&row.role),
        claimed_by: row.claimed_by.map(UserId::from_uuid),
        created_at: row.created_at,
    })
}

async fn load_invite(
    conn: &mut AsyncPgConnection,
    token: &str,
) -> Result<Option<InviteRow>, diesel::result::Error> {
    project_invites::table
        .find(token)
        .select(InviteRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl InviteRepository for DieselInviteRepository {
    async fn create_if_absent(&self, invite: &Invite) -> Result<bool, InviteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewInviteRow {
            token: invite.token.as_str(),
            project_id: *invite.project_id.as_uuid(),
            email: invite.email.as_str(),
            role: invite.role.as_str(),
            created_at: invite.created_at,
        };
        let inserted = diesel::insert_into(project_invites::table)
            .values(&row)
            .on_conflict((project_invites::project_id, project_invites::email))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn find_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<Invite>, InviteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_invite(&mut conn, token.as_str())
            .await
            .map_err(map_diesel_error)?
            .map(row_to_invite)
            .transpose()
    }

    async fn claim(
        &self,
        token: &InviteToken,
        user_id: &UserId,
    ) -> Result<Option<Invite>, InviteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = *user_id.as_uuid();
        let claimed = conn
            .transaction(|conn| {
                async move {
                    let Some(invite) = load_invite(conn, token.as_str()).await? else {
                        return Ok(None);
                    };
                    let role = ProjectRole::from(InviteRole::from_storage(&invite.role));
                    diesel::insert_into(project_members::table)
                        .values(&NewMemberRow {
                            project_id: invite.project_id,
                            user_id: user,
                            role: role.as_str(),
                            status: MemberStatus::Active.as_str(),
                        })
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                    // Only the first claimer is recorded.
                    diesel::update(
                        project_invites::table
                            .find(token.as_str())
                            .filter(project_invites::claimed_by.is_null()),
                    )
                    .set(project_invites::claimed_by.eq(user))
                    .execute(conn)
                    .await?;
                    load_invite(conn, token.as_str()).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        claimed.map(row_to_invite).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn row(token: String, role: &str) -> InviteRow {
        InviteRow {
            token,
            project_id: Uuid::nil(),
            email: "Guest@Example.com".to_owned(),
            role: role.to_owned(),
            claimed_by: None,
            created_at: Utc
                .with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
                .single()
                .expect("timestamp"),
        }
    }

    #[rstest]
    fn stored_invite_converts() {
        let token = InviteToken::generate();
        let invite = row_to_invite(row(token.as_str().to_owned(), "viewer")).expect("valid row");
        assert_eq!(invite.token, token);
        assert_eq!(invite.role, InviteRole::Viewer);
        assert_eq!(invite.email.as_str(), "guest@example.com");
    }

    #[rstest]
    fn malformed_stored_token_is_a_query_error() {
        let err = row_to_invite(row("short".to_owned(), "editor")).expect_err("bad token");
        assert!(matches!(err, InviteRepositoryError::Query { .. }));
    }
}
