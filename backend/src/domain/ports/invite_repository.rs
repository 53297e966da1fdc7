//! Port for project invites.
use async_trait::async_trait;

use crate::domain::{Invite, InviteToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invite repository adapters.
    pub enum InviteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "invite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invite repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Insert the invite unless one exists for the same project and email.
    /// Returns whether a row was written.
    async fn create_if_absent(&self, invite: &Invite) -> Result<bool, InviteRepositoryError>;

    /// Look an invite up by token.
    async fn find_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<Option<Invite>, InviteRepositoryError>;

    /// In one transaction add `user_id` to the invite's project with the
    /// invite's role (existing memberships are kept) and record the claim.
    /// Returns the claimed invite, or `None` when the token is unknown.
    async fn claim(
        &self,
        token: &InviteToken,
        user_id: &UserId,
    ) -> Result<Option<Invite>, InviteRepositoryError>;
}
