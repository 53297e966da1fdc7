//! Driving port for reading the friend list.

use async_trait::async_trait;

use crate::domain::{Error, FriendList, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipQuery: Send + Sync {
    /// Accepted friends plus incoming pending requests.
    async fn list(&self, me: &UserId) -> Result<FriendList, Error>;
}
