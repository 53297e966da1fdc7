//! `SearchCache` implementation over a `bb8-redis` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use tracing::debug;

use crate::domain::PlaceSuggestion;
use crate::domain::ports::{SearchCache, SearchCacheError, SearchCacheKey};

/// Errors raised while building the Redis pool.
#[derive(Debug, thiserror::Error)]
pub enum RedisSearchCacheError {
    /// The Redis URL could not be parsed.
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),
    /// The pool could not be established.
    #[error("failed to build redis pool: {0}")]
    Build(String),
}

/// Places search cache stored in Redis with a fixed TTL.
#[derive(Clone)]
pub struct RedisSearchCache {
    pool: Pool<RedisConnectionManager>,
    ttl: Duration,
}

impl RedisSearchCache {
    /// Connect a pool to `redis_url`. Entries expire after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`RedisSearchCacheError`] when the URL is invalid or the pool
    /// cannot be built.
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, RedisSearchCacheError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| RedisSearchCacheError::InvalidUrl(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(2))
            .build(manager)
            .await
            .map_err(|err| RedisSearchCacheError::Build(err.to_string()))?;
        Ok(Self { pool, ttl })
    }

    fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

fn encode(results: &[PlaceSuggestion]) -> Result<String, SearchCacheError> {
    serde_json::to_string(results).map_err(|err| SearchCacheError::serialization(err.to_string()))
}

fn decode(raw: &str) -> Result<Vec<PlaceSuggestion>, SearchCacheError> {
    serde_json::from_str(raw).map_err(|err| SearchCacheError::serialization(err.to_string()))
}

#[async_trait]
impl SearchCache for RedisSearchCache {
    async fn get(
        &self,
        key: &SearchCacheKey,
    ) -> Result<Option<Vec<PlaceSuggestion>>, SearchCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SearchCacheError::backend(err.to_string()))?;
        let raw: Option<String> = conn
            .get(key.as_str())
            .await
            .map_err(|err| SearchCacheError::backend(err.to_string()))?;
        debug!(key = %key, hit = raw.is_some(), "search cache lookup");
        raw.as_deref().map(decode).transpose()
    }

    async fn put(
        &self,
        key: &SearchCacheKey,
        results: &[PlaceSuggestion],
    ) -> Result<(), SearchCacheError> {
        let payload = encode(results)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SearchCacheError::backend(err.to_string()))?;
        conn.set_ex::<_, _, ()>(key.as_str(), payload, self.ttl_seconds())
            .await
            .map_err(|err| SearchCacheError::backend(err.to_string()))
    }
}
