//! Places search with a read-through cache.
//!
//! Concurrent misses on the same key each call the source; there is no
//! single-flight.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{PlacesSearchQuery, PlacesSource, PlacesSourceError, SearchCache};
use crate::domain::{Error, PlaceSuggestion, SearchQuery};

/// Implements [`PlacesSearchQuery`] over a source and a cache.
pub struct PlacesSearchService<S, C: ?Sized> {
    source: Arc<S>,
    cache: Arc<C>,
}

impl<S, C: ?Sized> PlacesSearchService<S, C> {
    pub fn new(source: Arc<S>, cache: Arc<C>) -> Self {
        Self { source, cache }
    }
}

fn map_source_error(error: PlacesSourceError) -> Error {
    Error::internal(format!("places search failed: {error}"))
}

#[async_trait]
impl<S, C> PlacesSearchQuery for PlacesSearchService<S, C>
where
    S: PlacesSource,
    C: SearchCache + ?Sized,
{
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PlaceSuggestion>, Error> {
        let key = query.cache_key();
        match self.cache.get(&key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "places search cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(key = %key, error = %err, "places search cache read failed"),
        }

        let results = self
            .source
            .search(query)
            .await
            .map_err(map_source_error)?;
        if let Err(err) = self.cache.put(&key, &results).await {
            tracing::warn!(key = %key, error = %err, "places search cache write failed");
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockPlacesSource, MockSearchCache, SearchCacheError};
    use rstest::{fixture, rstest};

    #[fixture]
    fn hit() -> Vec<PlaceSuggestion> {
        vec![PlaceSuggestion {
            external_id: "ChIJ1".to_owned(),
            name: "Senso-ji".to_owned(),
            address: Some("東京都台東区浅草2丁目3-1".to_owned()),
            lat: Some(35.7148),
            lng: Some(139.7967),
            rating: Some(4.5),
            photo_reference: None,
        }]
    }

    fn query() -> SearchQuery {
        SearchQuery::new("senso-ji").expect("query")
    }

    #[rstest]
    #[tokio::test]
    async fn cache_hit_skips_source(hit: Vec<PlaceSuggestion>) {
        let mut cache = MockSearchCache::new();
        let cached = hit.clone();
        cache.expect_get().return_once(move |_| Ok(Some(cached)));
        let mut source = MockPlacesSource::new();
        source.expect_search().never();

        let service = PlacesSearchService::new(Arc::new(source), Arc::new(cache));
        assert_eq!(service.search(&query()).await.expect("results"), hit);
    }

    #[rstest]
    #[tokio::test]
    async fn miss_fetches_and_populates(hit: Vec<PlaceSuggestion>) {
        let mut cache = MockSearchCache::new();
        cache.expect_get().return_once(|_| Ok(None));
        cache
            .expect_put()
            .withf(|key, results| key == &query().cache_key() && results.len() == 1)
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut source = MockPlacesSource::new();
        let fetched = hit.clone();
        source.expect_search().times(1).return_once(move |_| Ok(fetched));

        let service = PlacesSearchService::new(Arc::new(source), Arc::new(cache));
        assert_eq!(service.search(&query()).await.expect("results"), hit);
    }

    #[rstest]
    #[tokio::test]
    async fn cache_failures_are_bypassed(hit: Vec<PlaceSuggestion>) {
        let mut cache = MockSearchCache::new();
        cache
            .expect_get()
            .return_once(|_| Err(SearchCacheError::backend("connection reset")));
        cache
            .expect_put()
            .return_once(|_, _| Err(SearchCacheError::backend("connection reset")));
        let mut source = MockPlacesSource::new();
        let fetched = hit.clone();
        source.expect_search().return_once(move |_| Ok(fetched));

        let service = PlacesSearchService::new(Arc::new(source), Arc::new(cache));
        assert_eq!(service.search(&query()).await.expect("results"), hit);
    }

    #[rstest]
    #[tokio::test]
    async fn source_failure_is_internal() {
        let mut cache = MockSearchCache::new();
        cache.expect_get().return_once(|_| Ok(None));
        let mut source = MockPlacesSource::new();
        source
            .expect_search()
            .return_once(|_| Err(PlacesSourceError::timeout("10s elapsed")));

        let service = PlacesSearchService::new(Arc::new(source), Arc::new(cache));
        let err = service.search(&query()).await.expect_err("failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
