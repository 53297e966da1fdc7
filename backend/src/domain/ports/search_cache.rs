//! Port interface for caching Places search results.
use async_trait::async_trait;

use crate::domain::PlaceSuggestion;

use super::{SearchCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum SearchCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "search cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "search cache serialisation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchCache: Send + Sync {
    /// Read cached results for the given key.
    async fn get(&self, key: &SearchCacheKey)
    -> Result<Option<Vec<PlaceSuggestion>>, SearchCacheError>;

    /// Store results under the key with the adapter's fixed expiry.
    async fn put(
        &self,
        key: &SearchCacheKey,
        results: &[PlaceSuggestion],
    ) -> Result<(), SearchCacheError>;
}

/// Cache used when no backend is configured: every read misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSearchCache;

#[async_trait]
impl SearchCache for NoopSearchCache {
    async fn get(
        &self,
        _key: &SearchCacheKey,
    ) -> Result<Option<Vec<PlaceSuggestion>>, SearchCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _key: &SearchCacheKey,
        _results: &[PlaceSuggestion],
    ) -> Result<(), SearchCacheError> {
        Ok(())
    }
}
