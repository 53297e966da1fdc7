//! Identity provider adapters.
//!
//! The provider signs short-lived HS256 JWTs; this adapter only verifies
//! them and extracts the subject and email claims.

mod jwt_identity_provider;

pub use jwt_identity_provider::{JwtIdentityConfig, JwtIdentityProvider};
