//! Driven port for verifying tokens issued by the external identity
//! provider.
use async_trait::async_trait;

use crate::domain::ExternalIdentity;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while verifying a provider token.
    pub enum IdentityProviderError {
        /// The token is malformed, expired, or has a bad signature.
        InvalidToken { message: String } => "identity token rejected: {message}",
        /// The provider could not be consulted.
        Unavailable { message: String } => "identity provider unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token and return the identity it asserts.
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityProviderError>;
}
