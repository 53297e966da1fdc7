//! Identity resolution and profile services.
//!
//! Signing in verifies the provider token and maps the external subject to an
//! internal user, creating the user the first time the subject is seen.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, LoginService, UserPersistenceError,
    UserProfileCommand, UserProfileQuery, UserRepository,
};
use crate::domain::{Email, Error, ExternalSubject, ProfileUpdate, User, UserId};

/// Implements sign-in and profile ports over a user repository.
pub struct IdentityService<U, P> {
    users: Arc<U>,
    provider: Arc<P>,
}

impl<U, P> IdentityService<U, P> {
    pub fn new(users: Arc<U>, provider: Arc<P>) -> Self {
        Self { users, provider }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::EmailTaken { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
        UserPersistenceError::HandleTaken { handle } => {
            Error::conflict("handle is already taken").with_details(json!({
                "field": "handle",
                "code": "handle_taken",
                "value": handle,
            }))
        }
    }
}

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidToken { message } => {
            tracing::debug!(%message, "identity token rejected");
            Error::unauthorized("invalid identity token")
        }
        IdentityProviderError::Unavailable { message } => {
            Error::internal(format!("identity provider unavailable: {message}"))
        }
    }
}

impl<U, P> IdentityService<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    async fn resolve(&self, subject: &ExternalSubject, email: Option<Email>) -> Result<User, Error> {
        let placeholder = Email::placeholder_for(subject);
        let email = email.unwrap_or_else(|| placeholder.clone());
        match self.users.upsert_by_subject(subject, &email).await {
            Ok(user) => Ok(user),
            // Someone else registered this address first; fall back to the
            // synthetic address so the subject still gets an account.
            Err(UserPersistenceError::EmailTaken { .. }) if email != placeholder => {
                tracing::warn!(
                    subject = subject.as_str(),
                    "provider email already registered; using placeholder"
                );
                self.users
                    .upsert_by_subject(subject, &placeholder)
                    .await
                    .map_err(map_user_error)
            }
            Err(err) => Err(map_user_error(err)),
        }
    }
}

#[async_trait]
impl<U, P> LoginService for IdentityService<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    async fn login(&self, token: &str) -> Result<UserId, Error> {
        let identity = self
            .provider
            .verify(token)
            .await
            .map_err(map_provider_error)?;
        let user = self.resolve(&identity.subject, identity.email).await?;
        tracing::info!(user_id = %user.id, "user signed in");
        Ok(user.id)
    }
}

#[async_trait]
impl<U, P> UserProfileQuery for IdentityService<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<U, P> UserProfileCommand for IdentityService<U, P>
where
    U: UserRepository,
    P: IdentityProvider,
{
    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        if update.is_empty() {
            return self.fetch_profile(user_id).await;
        }
        self.users
            .update_profile(user_id, &update)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockIdentityProvider, MockUserRepository};
    use crate::domain::{ErrorCode, ExternalIdentity, Handle};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn user_for(subject: &ExternalSubject, email: &Email) -> User {
        User {
            id: UserId::random(),
            external_subject: subject.clone(),
            email: email.clone(),
            handle: None,
            bio: None,
            avatar_key: None,
        }
    }

    fn provider_returning(subject: &str, email: Option<&str>) -> MockIdentityProvider {
        let identity = ExternalIdentity {
            subject: ExternalSubject::new(subject).expect("subject"),
            email: email.map(|e| Email::new(e).expect("email")),
        };
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .return_once(move |_| Ok(identity));
        provider
    }

    #[rstest]
    #[tokio::test]
    async fn login_uses_placeholder_when_provider_has_no_email() {
        let provider = provider_returning("oidc|42", None);
        let mut users = MockUserRepository::new();
        let expected = Email::new("oidc_42@users.tripboard.invalid").expect("email");
        users
            .expect_upsert_by_subject()
            .with(mockall::predicate::always(), eq(expected))
            .times(1)
            .returning(|subject, email| Ok(user_for(subject, email)));

        let service = IdentityService::new(Arc::new(users), Arc::new(provider));
        service.login("token").await.expect("login succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn login_falls_back_to_placeholder_when_email_is_taken() {
        let provider = provider_returning("sub-1", Some("ada@example.com"));
        let mut users = MockUserRepository::new();
        let mut seq = mockall::Sequence::new();
        users
            .expect_upsert_by_subject()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, email| Err(UserPersistenceError::email_taken(email.as_str())));
        users
            .expect_upsert_by_subject()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|subject, email| {
                assert!(email.as_str().ends_with("@users.tripboard.invalid"));
                Ok(user_for(subject, email))
            });

        let service = IdentityService::new(Arc::new(users), Arc::new(provider));
        service.login("token").await.expect("login succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_tokens_are_unauthorised() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify()
            .return_once(|_| Err(IdentityProviderError::invalid_token("expired")));
        let service = IdentityService::new(Arc::new(MockUserRepository::new()), Arc::new(provider));

        let err = service.login("stale").await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn handle_clash_is_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_profile()
            .return_once(|_, _| Err(UserPersistenceError::handle_taken("ada")));
        let service = IdentityService::new(Arc::new(users), Arc::new(MockIdentityProvider::new()));

        let update = ProfileUpdate {
            handle: Some(Handle::new("ada").expect("handle")),
            ..ProfileUpdate::default()
        };
        let err = service
            .update_profile(&UserId::random(), update)
            .await
            .expect_err("clash");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some("handle_taken")
        );
    }
}
