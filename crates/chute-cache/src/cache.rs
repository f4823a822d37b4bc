use crate::error::Result;
use async_trait::async_trait;
use chute_core::ShortCode;
use std::time::Duration;

/// A hot cache of short code to long URL.
///
/// The value is the long URL itself; nothing else is cached. Entries carry
/// a TTL so that the cache stays bounded without any explicit eviction by
/// the services.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Looks up the long URL for a short code.
    ///
    /// Returns `Ok(None)` on a cache miss.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Stores the long URL for a short code, expiring after `ttl`.
    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;
}
