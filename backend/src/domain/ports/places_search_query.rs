//! Driving port for Places search.

use async_trait::async_trait;

use crate::domain::{Error, PlaceSuggestion, SearchQuery};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlacesSearchQuery: Send + Sync {
    /// Search, serving repeated queries from the cache.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlaceSuggestion>, Error>;
}
