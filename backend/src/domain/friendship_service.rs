//! Friendship domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    FriendshipCommand, FriendshipQuery, FriendshipRepository, FriendshipRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Email, Error, FriendList, FriendRequestOutcome, UserId};

/// Implements the friendship driving ports.
pub struct FriendshipService<U, F> {
    users: Arc<U>,
    friendships: Arc<F>,
}

impl<U, F> FriendshipService<U, F> {
    pub fn new(users: Arc<U>, friendships: Arc<F>) -> Self {
        Self { users, friendships }
    }
}

fn map_friendship_error(error: FriendshipRepositoryError) -> Error {
    match error {
        FriendshipRepositoryError::Connection { message } => {
            Error::internal(format!("friendship repository unavailable: {message}"))
        }
        FriendshipRepositoryError::Query { message } => {
            Error::internal(format!("friendship repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    Error::internal(format!("user lookup failed: {error}"))
}

#[async_trait]
impl<U, F> FriendshipCommand for FriendshipService<U, F>
where
    U: UserRepository,
    F: FriendshipRepository,
{
    async fn request(&self, me: &UserId, email: &Email) -> Result<FriendRequestOutcome, Error> {
        let target = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("no user is registered with that email"))?;
        if target.id == *me {
            return Err(Error::invalid_request("you cannot send a friend request to yourself"));
        }

        let existing = self
            .friendships
            .find_between(me, &target.id)
            .await
            .map_err(map_friendship_error)?;
        if existing.is_some() {
            return Ok(FriendRequestOutcome::AlreadyExists);
        }

        let written = self
            .friendships
            .insert_pending(me, &target.id)
            .await
            .map_err(map_friendship_error)?;
        if written {
            tracing::info!(requester = %me, target = %target.id, "friend request sent");
            Ok(FriendRequestOutcome::Requested)
        } else {
            Ok(FriendRequestOutcome::AlreadyExists)
        }
    }

    async fn accept(&self, me: &UserId, friend: &UserId) -> Result<(), Error> {
        let accepted = self
            .friendships
            .accept(me, friend)
            .await
            .map_err(map_friendship_error)?;
        if !accepted {
            return Err(Error::conflict("there is no pending friend request from this user"));
        }
        Ok(())
    }
}

#[async_trait]
impl<U, F> FriendshipQuery for FriendshipService<U, F>
where
    U: UserRepository,
    F: FriendshipRepository,
{
    async fn list(&self, me: &UserId) -> Result<FriendList, Error> {
        let friends = self
            .friendships
            .list_friends(me)
            .await
            .map_err(map_friendship_error)?;
        let incoming = self
            .friendships
            .list_incoming(me)
            .await
            .map_err(map_friendship_error)?;
        Ok(FriendList { friends, incoming })
    }
}
