//! Friendship graph between users.
//!
//! A request stores a `pending` edge from the requester to the target.
//! Accepting flips that edge and writes the mirrored edge, both `accepted`.

use std::fmt;
use std::str::FromStr;

use super::{UserId, UserSummary};

/// Status of a directed friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored status is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown friendship status: {0}")]
pub struct UnknownFriendshipStatus(pub String);

impl FromStr for FriendshipStatus {
    type Err = UnknownFriendshipStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            other => Err(UnknownFriendshipStatus(other.to_owned())),
        }
    }
}

/// Directed edge `user_id -> friend_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: FriendshipStatus,
    pub requested_by: UserId,
}

/// Outcome of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendRequestOutcome {
    /// A new pending edge was written.
    Requested,
    /// An edge between the pair already existed; nothing changed.
    AlreadyExists,
}

/// Friends and incoming requests as seen by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendList {
    /// Accepted friends in either direction.
    pub friends: Vec<UserSummary>,
    /// Users with a pending request addressed to the viewer.
    pub incoming: Vec<UserSummary>,
}
