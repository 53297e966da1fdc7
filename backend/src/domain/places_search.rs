//! Text search against the external Places API.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ports::SearchCacheKey;

/// Maximum length of a search query after trimming.
pub const SEARCH_QUERY_MAX: usize = 200;

/// Raised when a query is blank or too long.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("query must be between 1 and {max} characters")]
pub struct InvalidSearchQuery {
    pub max: usize,
}

/// Trimmed, length-checked search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidSearchQuery> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length == 0 || length > SEARCH_QUERY_MAX {
            return Err(InvalidSearchQuery {
                max: SEARCH_QUERY_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Cache key shared by queries that differ only in letter case.
    ///
    /// # Examples
    /// ```
    /// use tripboard::domain::SearchQuery;
    ///
    /// let a = SearchQuery::new("Tokyo Tower").expect("query").cache_key();
    /// let b = SearchQuery::new(" tokyo tower ").expect("query").cache_key();
    /// assert_eq!(a, b);
    /// assert!(a.as_str().starts_with("places:search:v1:"));
    /// ```
    pub fn cache_key(&self) -> SearchCacheKey {
        let digest = Sha256::digest(self.0.to_lowercase().as_bytes());
        SearchCacheKey::for_digest(&hex::encode(digest))
    }
}

/// One search hit as returned to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub rating: Option<f64>,
    pub photo_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_queries_are_rejected(#[case] raw: &str) {
        assert!(SearchQuery::new(raw).is_err());
    }

    #[rstest]
    fn long_queries_are_rejected() {
        assert!(SearchQuery::new("寺".repeat(SEARCH_QUERY_MAX)).is_ok());
        assert!(SearchQuery::new("寺".repeat(SEARCH_QUERY_MAX + 1)).is_err());
    }

    #[rstest]
    fn cache_key_hashes_lowercased_query() {
        let key = SearchQuery::new("ABC").expect("query").cache_key();
        assert_eq!(
            key.as_str(),
            "places:search:v1:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
