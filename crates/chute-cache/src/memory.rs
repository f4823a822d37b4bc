use crate::cache::UrlCache;
use crate::error::Result;
use async_trait::async_trait;
use chute_core::ShortCode;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    long_url: String,
    expires_at: Instant,
}

/// In-process implementation of [`UrlCache`] with real TTL expiry.
///
/// Backs the service and router tests; expired entries are dropped lazily
/// on read.
#[derive(Debug, Default)]
pub struct MemoryUrlCache {
    entries: DashMap<String, Entry>,
}

impl MemoryUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops an entry immediately, regardless of TTL. Test hook for
    /// forcing the miss-fallthrough path.
    pub fn evict(&self, code: &ShortCode) {
        self.entries.remove(code.as_str());
    }
}

#[async_trait]
impl UrlCache for MemoryUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        if let Some(entry) = self.entries.get(code.as_str()) {
            if Instant::now() >= entry.expires_at {
                drop(entry);
                self.entries.remove(code.as_str());
                return Ok(None);
            }
            return Ok(Some(entry.long_url.clone()));
        }
        Ok(None)
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            code.as_str().to_string(),
            Entry {
                long_url: long_url.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
