//! Email invitations into projects.
//!
//! An invite is addressed to an email but claimed by whoever presents its
//! token while signed in; the visiting account's email is not compared with
//! the invited address.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::RngCore;

use super::{Email, ProjectId, ProjectRole, UserId};

/// Number of random bytes in an invite token.
pub const INVITE_TOKEN_BYTES: usize = 32;

/// Raised when a token is not `2 * INVITE_TOKEN_BYTES` hex characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invite token must be {len} lowercase hex characters")]
pub struct InvalidInviteToken {
    pub len: usize,
}

/// Random, URL-safe invite token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InviteToken(String);

impl InviteToken {
    /// Generate a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; INVITE_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Validate a token received in a link.
    ///
    /// # Examples
    /// ```
    /// use tripboard::domain::InviteToken;
    ///
    /// let token = InviteToken::generate();
    /// assert_eq!(InviteToken::new(token.as_str()), Ok(token));
    /// assert!(InviteToken::new("short").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidInviteToken> {
        let raw = raw.as_ref();
        let expected = INVITE_TOKEN_BYTES * 2;
        let well_formed = raw.len() == expected
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(InvalidInviteToken { len: expected });
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InviteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role granted by an invite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InviteRole {
    #[default]
    Editor,
    Viewer,
}

impl InviteRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Parse a stored role, downgrading anything unrecognised to `editor`.
    pub fn from_storage(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Editor)
    }
}

impl From<InviteRole> for ProjectRole {
    fn from(value: InviteRole) -> Self {
        match value {
            InviteRole::Editor => Self::Editor,
            InviteRole::Viewer => Self::Viewer,
        }
    }
}

/// Raised when an invite role is neither `editor` nor `viewer`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invite role must be editor or viewer, got {0}")]
pub struct UnknownInviteRole(pub String);

impl FromStr for InviteRole {
    type Err = UnknownInviteRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(UnknownInviteRole(other.to_owned())),
        }
    }
}

/// Stored invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub project_id: ProjectId,
    pub email: Email,
    pub token: InviteToken,
    pub role: InviteRole,
    pub claimed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Request to invite a batch of addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendInvitesRequest {
    pub actor: UserId,
    pub project_id: ProjectId,
    pub emails: Vec<Email>,
    pub role: InviteRole,
}

/// Counts reported back after sending invites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InviteSummary {
    /// New invites created (and mailed).
    pub invited: usize,
    /// Addresses that already had an invite for the project.
    pub already_invited: usize,
    /// Addresses that belong to registered users and were skipped.
    pub skipped_existing_users: usize,
}

/// Message handed to the invite mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEmail {
    pub to: Email,
    pub project_title: String,
    pub inviter: String,
    pub accept_url: String,
    pub role: InviteRole,
}
