//! Redis-backed caching adapters.
//!
//! Values are stored as JSON strings with a fixed expiry. Keys come from the
//! domain already namespaced (`places:search:v1:<sha256>`), so bumping the
//! version segment invalidates every entry written by an older release.

mod redis_search_cache;

pub use redis_search_cache::{RedisSearchCache, RedisSearchCacheError};
