//! Cache key type shared by search cache adapters.
use thiserror::Error;

/// Namespace prefix for cached Places search results.
pub const SEARCH_CACHE_PREFIX: &str = "places:search:v1:";

/// Cache key under which search results are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchCacheKey(String);

impl SearchCacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, SearchCacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(SearchCacheKeyValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(SearchCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key for a hex-encoded query digest.
    pub(crate) fn for_digest(digest_hex: &str) -> Self {
        Self(format!("{SEARCH_CACHE_PREFIX}{digest_hex}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for SearchCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SearchCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`SearchCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchCacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("search cache key must not be empty")]
    Empty,
    /// Key contains whitespace, which the cache protocol does not allow.
    #[error("search cache key must not contain whitespace")]
    ContainsWhitespace,
}
