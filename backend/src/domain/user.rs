//! User data model.
//!
//! Users are created the first time an external identity signs in and are
//! addressed internally by [`UserId`]. Email addresses are stored normalised
//! (trimmed, lower-cased) so invitation and friend lookups compare equal.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Minimum allowed length for a handle.
pub const HANDLE_MIN: usize = 3;
/// Maximum allowed length for a handle.
pub const HANDLE_MAX: usize = 32;
/// Maximum allowed length for a profile bio.
pub const BIO_MAX: usize = 500;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

/// Domain used for synthetic addresses when the provider withholds an email.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "users.tripboard.invalid";

/// Validation errors returned by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("external subject must not be empty")]
    EmptySubject,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid address of at most {max} characters")]
    InvalidEmail { max: usize },
    #[error("handle must be between {min} and {max} characters")]
    HandleLength { min: usize, max: usize },
    #[error("handle may only contain lowercase letters, digits, or underscores")]
    HandleInvalidCharacters,
    #[error("bio must be at most {max} characters")]
    BioTooLong { max: usize },
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static HANDLE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn handle_regex() -> &'static Regex {
    HANDLE_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[a-z0-9_]+$")
            .unwrap_or_else(|error| panic!("handle regex failed to compile: {error}"))
    })
}

/// Subject identifier issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalSubject(String);

impl ExternalSubject {
    /// Validate and construct a subject identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptySubject);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the subject as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ExternalSubject {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<ExternalSubject> for String {
    fn from(value: ExternalSubject) -> Self {
        value.0
    }
}

impl TryFrom<String> for ExternalSubject {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalised email address.
///
/// # Examples
/// ```
/// use tripboard::domain::Email;
///
/// let email = Email::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalise (trim and lower-case) and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail { max: EMAIL_MAX });
        }
        Ok(Self(normalised))
    }

    /// Synthetic address used when the identity provider has no email.
    pub fn placeholder_for(subject: &ExternalSubject) -> Self {
        let local: String = subject
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        Self(format!("{local}@{PLACEHOLDER_EMAIL_DOMAIN}"))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public handle chosen in profile settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Validate and construct a handle.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let length = raw.chars().count();
        if !(HANDLE_MIN..=HANDLE_MAX).contains(&length) {
            return Err(UserValidationError::HandleLength {
                min: HANDLE_MIN,
                max: HANDLE_MAX,
            });
        }
        if !handle_regex().is_match(&raw) {
            return Err(UserValidationError::HandleInvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the handle as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl TryFrom<String> for Handle {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-form profile text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bio(String);

impl Bio {
    /// Validate and construct a bio.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.chars().count() > BIO_MAX {
            return Err(UserValidationError::BioTooLong { max: BIO_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the bio as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Bio> for String {
    fn from(value: Bio) -> Self {
        value.0
    }
}

impl TryFrom<String> for Bio {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub external_subject: ExternalSubject,
    pub email: Email,
    pub handle: Option<Handle>,
    pub bio: Option<Bio>,
    /// Object-storage key of the avatar image.
    pub avatar_key: Option<String>,
}

impl User {
    /// Project the user onto the fields other members may see.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            handle: self.handle.clone(),
            avatar_key: self.avatar_key.clone(),
        }
    }
}

/// Public view of a user shown in friend and member lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub handle: Option<Handle>,
    pub avatar_key: Option<String>,
}

/// Identity asserted by the external provider after token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub subject: ExternalSubject,
    pub email: Option<Email>,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub handle: Option<Handle>,
    pub bio: Option<Bio>,
    pub avatar_key: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.handle.is_none() && self.bio.is_none() && self.avatar_key.is_none()
    }
}
