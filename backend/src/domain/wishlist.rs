//! Personal wishlists of saved places.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Place, UserId};

/// Maximum length of a wishlist or selection note.
pub const NOTE_MAX: usize = 1000;

/// Raised when a note exceeds [`NOTE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("note must be at most {max} characters")]
pub struct NoteTooLong {
    pub max: usize,
}

/// Free-form note attached to a saved place or a selection.
///
/// # Examples
/// ```
/// use tripboard::domain::Note;
///
/// assert!(Note::new("try the matcha").is_ok());
/// assert!(Note::new("x".repeat(1001)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note(String);

impl Note {
    /// Validate and construct a note.
    pub fn new(raw: impl Into<String>) -> Result<Self, NoteTooLong> {
        let raw = raw.into();
        if raw.chars().count() > NOTE_MAX {
            return Err(NoteTooLong { max: NOTE_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the note text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Note> for String {
    fn from(value: Note) -> Self {
        value.0
    }
}

impl TryFrom<String> for Note {
    type Error = NoteTooLong;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A place saved to a user's wishlist.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub user_id: UserId,
    pub place: Place,
    pub note: Option<Note>,
    pub saved_at: DateTime<Utc>,
}
