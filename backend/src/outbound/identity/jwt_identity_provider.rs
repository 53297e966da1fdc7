//! `IdentityProvider` backed by `jsonwebtoken` HS256 verification.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Email, ExternalIdentity, ExternalSubject};

/// Shared secret and expected claims for provider tokens.
pub struct JwtIdentityConfig {
    /// HMAC secret shared with the identity provider.
    pub secret: Zeroizing<String>,
    /// Required `iss` claim.
    pub issuer: String,
    /// Required `aud` claim.
    pub audience: String,
}

#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies provider-issued JWTs.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    /// Build a verifier for the given secret, issuer, and audience.
    pub fn new(config: &JwtIdentityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    fn identity_from(claims: ProviderClaims) -> Result<ExternalIdentity, IdentityProviderError> {
        let subject = ExternalSubject::new(claims.sub)
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
        // A malformed email claim is ignored; the resolver falls back to a
        // placeholder address.
        let email = claims.email.and_then(|raw| {
            Email::new(&raw)
                .inspect_err(|err| tracing::warn!(error = %err, "ignoring invalid email claim"))
                .ok()
        });
        Ok(ExternalIdentity { subject, email })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityProviderError> {
        let data = decode::<ProviderClaims>(token, &self.key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => IdentityProviderError::invalid_token("token expired"),
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    IdentityProviderError::invalid_token("token issued for another service")
                }
                _ => IdentityProviderError::invalid_token(err.to_string()),
            }
        })?;
        Self::identity_from(data.claims)
    }
}
