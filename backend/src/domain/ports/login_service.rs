//! Driving port for signing in with an identity-provider token.
//!
//! Inbound adapters call it to turn a provider token into an internal user
//! id without knowing how tokens are verified or users are stored.

use async_trait::async_trait;

use crate::domain::{Error, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify the token and return the internal user id, creating the user
    /// on first sight.
    async fn login(&self, token: &str) -> Result<UserId, Error>;
}
