//! Driving port for profile edits.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, User, UserId};

/// Domain use-case port for updating the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Apply the update; a handle held by someone else is a conflict.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;
}
