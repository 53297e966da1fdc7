//! Driving port for sending and accepting invites.

use async_trait::async_trait;

use crate::domain::{Error, InviteSummary, InviteToken, ProjectId, SendInvitesRequest, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteCommand: Send + Sync {
    /// Invite addresses that do not belong to registered users. Requires
    /// editor.
    async fn send(&self, request: SendInvitesRequest) -> Result<InviteSummary, Error>;

    /// Claim an invite for `user_id` and return the project it grants.
    async fn accept(&self, token: &InviteToken, user_id: &UserId) -> Result<ProjectId, Error>;
}
