//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, ExternalSubject, ProfileUpdate, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already holds the email address.
        EmailTaken { email: String } => "email {email} is already registered",
        /// Another user already holds the handle.
        HandleTaken { handle: String } => "handle {handle} is already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return the user for `subject`, inserting one with `email` when absent.
    ///
    /// Concurrent calls for the same subject converge on one row; an
    /// existing row is returned unchanged.
    async fn upsert_by_subject(
        &self,
        subject: &ExternalSubject,
        email: &Email,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Apply a profile update and return the stored user, or `None` when the
    /// user does not exist.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;
}
