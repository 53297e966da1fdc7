//! Driving port for friend requests.

use async_trait::async_trait;

use crate::domain::{Email, Error, FriendRequestOutcome, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipCommand: Send + Sync {
    /// Send a friend request to the user registered under `email`.
    ///
    /// # Errors
    ///
    /// - not found when no user has the address;
    /// - invalid request when the address is the caller's own.
    async fn request(&self, me: &UserId, email: &Email) -> Result<FriendRequestOutcome, Error>;

    /// Accept a pending request sent by `friend`. Without one this is a
    /// conflict.
    async fn accept(&self, me: &UserId, friend: &UserId) -> Result<(), Error>;
}
