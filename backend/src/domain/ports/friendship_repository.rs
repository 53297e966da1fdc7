//! Port for the friendship graph.
use async_trait::async_trait;

use crate::domain::{Friendship, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by friendship repository adapters.
    pub enum FriendshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "friendship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "friendship repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Fetch the edge between two users in either direction, preferring
    /// `a -> b` when both exist.
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Friendship>, FriendshipRepositoryError>;

    /// Insert a pending edge `requester -> target`; an existing edge is left
    /// untouched. Returns whether a row was written.
    async fn insert_pending(
        &self,
        requester: &UserId,
        target: &UserId,
    ) -> Result<bool, FriendshipRepositoryError>;

    /// In one transaction flip the pending edge `friend -> me` to accepted
    /// and upsert the accepted edge `me -> friend`.
    ///
    /// Returns `false` without writing when no pending edge exists.
    async fn accept(&self, me: &UserId, friend: &UserId)
    -> Result<bool, FriendshipRepositoryError>;

    /// Accepted friends of `me` in either direction, each listed once.
    async fn list_friends(&self, me: &UserId)
    -> Result<Vec<UserSummary>, FriendshipRepositoryError>;

    /// Requesters of pending edges addressed to `me`.
    async fn list_incoming(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserSummary>, FriendshipRepositoryError>;

    /// Whether the two users are accepted friends.
    async fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool, FriendshipRepositoryError>;
}
