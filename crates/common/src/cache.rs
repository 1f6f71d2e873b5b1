//! Full-page caching with Redis.
//!
//! The landing feed is served from a rendered-page cache: the first request
//! renders and stores the body, later requests within the TTL window get the
//! stored bytes back unchanged. Creating a post does not invalidate the
//! entry; staleness up to the TTL is accepted.
//!
//! # Example
//!
//! ```ignore
//! use quill_common::cache::PageCache;
//! use fred::clients::Client as RedisClient;
//! use std::sync::Arc;
//!
//! let cache = PageCache::new(Arc::new(redis_client));
//!
//! if let Some(body) = cache.get(PageCache::LANDING_KEY).await? {
//!     // Serve cached body
//! } else {
//!     let body = render_landing_feed().await?;
//!     cache.set(PageCache::LANDING_KEY, &body).await?;
//! }
//! ```

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default cache TTL for rendered pages: 20 seconds.
const DEFAULT_PAGE_TTL_SECS: i64 = 20;

/// Rendered-page cache using Redis.
#[derive(Clone)]
pub struct PageCache {
    redis: Arc<RedisClient>,
    ttl_secs: i64,
}

impl PageCache {
    /// Cache key for the global landing feed.
    pub const LANDING_KEY: &'static str = "landing";

    /// Create a new page cache with the default TTL.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            ttl_secs: DEFAULT_PAGE_TTL_SECS,
        }
    }

    /// Create a new page cache with a custom TTL.
    #[must_use]
    pub const fn with_ttl(redis: Arc<RedisClient>, ttl: Duration) -> Self {
        Self {
            redis,
            ttl_secs: ttl.as_secs() as i64,
        }
    }

    /// Generate the Redis key for a page.
    fn cache_key(key: &str) -> String {
        format!("page_cache:{key}")
    }

    /// Get a cached page body.
    ///
    /// Returns `Ok(Some(body))` on a hit, `Ok(None)` on a miss.
    pub async fn get(&self, key: &str) -> Result<Option<String>, PageCacheError> {
        let redis_key = Self::cache_key(key);

        let result: Option<String> = self
            .redis
            .get(redis_key)
            .await
            .map_err(|e| PageCacheError::Redis(e.to_string()))?;

        if result.is_some() {
            debug!(key = %key, "Page cache hit");
        } else {
            debug!(key = %key, "Page cache miss");
        }

        Ok(result)
    }

    /// Store a rendered page body, valid for the configured TTL.
    pub async fn set(&self, key: &str, body: &str) -> Result<(), PageCacheError> {
        let redis_key = Self::cache_key(key);

        self.redis
            .set::<(), _, _>(
                redis_key,
                body,
                Some(Expiration::EX(self.ttl_secs)),
                None,
                false,
            )
            .await
            .map_err(|e| PageCacheError::Redis(e.to_string()))?;

        debug!(key = %key, bytes = body.len(), "Cached rendered page");

        Ok(())
    }

    /// Invalidate a cached page.
    pub async fn invalidate(&self, key: &str) -> Result<(), PageCacheError> {
        let redis_key = Self::cache_key(key);

        self.redis
            .del::<(), _>(redis_key)
            .await
            .map_err(|e| PageCacheError::Redis(e.to_string()))?;

        info!(key = %key, "Invalidated cached page");

        Ok(())
    }

    /// Clear the landing feed cache.
    ///
    /// The next landing request re-renders the feed and repopulates the entry.
    pub async fn clear(&self) -> Result<(), PageCacheError> {
        self.invalidate(Self::LANDING_KEY).await
    }
}

/// Page cache error type.
#[derive(Debug, thiserror::Error)]
pub enum PageCacheError {
    /// Redis operation failed.
    #[error("Redis error: {0}")]
    Redis(String),
}
