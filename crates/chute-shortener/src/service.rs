use crate::error::ShortenError;
use async_trait::async_trait;
use chute_cache::UrlCache;
use chute_core::{ShortCode, UrlRecord};
use chute_idgen::{CoordinationStore, IdAllocator};
use chute_storage::Repository;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, ShortenError>;

/// The create operation, as the HTTP edge sees it.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Mints a short code for `long_url`.
    async fn shorten(&self, long_url: &str) -> Result<ShortCode>;
}

/// A concrete [`Shortener`] over the ID allocator and the two-tier
/// persistence path.
///
/// Uniqueness comes entirely from the allocator; there is no existence
/// check or collision retry anywhere on this path.
pub struct ShortenerService<S, C, R> {
    allocator: IdAllocator<S>,
    cache: Arc<C>,
    repository: Arc<R>,
    cache_ttl: Duration,
}

impl<S, C, R> ShortenerService<S, C, R>
where
    S: CoordinationStore,
    C: UrlCache,
    R: Repository,
{
    pub fn new(
        allocator: IdAllocator<S>,
        cache: Arc<C>,
        repository: Arc<R>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            allocator,
            cache,
            repository,
            cache_ttl,
        }
    }
}

/// Checks the shape the redirector relies on: an http(s) scheme, a domain
/// with at least one dot, and at least two slashes overall.
fn validate_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ShortenError::InvalidUrl(format!(
            "scheme must be http or https: {url}"
        )));
    }
    if url.matches('.').count() < 1 {
        return Err(ShortenError::InvalidUrl(format!(
            "missing domain name: {url}"
        )));
    }
    if url.matches('/').count() < 2 {
        return Err(ShortenError::InvalidUrl(format!("missing path: {url}")));
    }
    Ok(())
}

#[async_trait]
impl<S, C, R> Shortener for ShortenerService<S, C, R>
where
    S: CoordinationStore,
    C: UrlCache,
    R: Repository,
{
    async fn shorten(&self, long_url: &str) -> Result<ShortCode> {
        validate_url(long_url)?;

        let id = self.allocator.pop()?;
        let code = ShortCode::from_id(id)?;

        // The cache write is the request's durability floor: if it fails,
        // the mint fails (the allocated ID is burned, which is fine).
        self.cache.set_url(&code, long_url, self.cache_ttl).await?;

        // The durable write is best-effort. The record stays readable via
        // the cache for at least the TTL; reconciliation closes the gap.
        let record = UrlRecord::new(id, long_url);
        if let Err(e) = self.repository.save(&record).await {
            warn!(id, error = %e, "durable save failed after cache write");
        }

        debug!(id, code = %code, "minted short code");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chute_cache::{CacheError, MemoryUrlCache};
    use chute_idgen::{IdAllocOptions, MemoryStore};
    use chute_storage::{InMemoryRepository, ReadRepository, StorageError};
    use std::collections::HashSet;

    const TTL: Duration = Duration::from_secs(60);

    fn alloc_options() -> IdAllocOptions {
        IdAllocOptions::builder()
            .segment_size(32)
            .segment_count_key("test/count".to_string())
            .segment_map_key("test/map".to_string())
            .max_segment_count(4)
            .build()
    }

    async fn allocator() -> IdAllocator<MemoryStore> {
        IdAllocator::bootstrap(Arc::new(MemoryStore::new()), &alloc_options())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn shorten_returns_a_seven_char_code() {
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(MemoryUrlCache::new()),
            Arc::new(InMemoryRepository::new()),
            TTL,
        );

        let code = service.shorten("http://example.com/").await.unwrap();
        assert_eq!(code.as_str().len(), 7);
    }

    #[tokio::test]
    async fn shorten_writes_both_tiers() {
        let cache = Arc::new(MemoryUrlCache::new());
        let repo = Arc::new(InMemoryRepository::new());
        let service =
            ShortenerService::new(allocator().await, Arc::clone(&cache), Arc::clone(&repo), TTL);

        let code = service.shorten("https://example.com/page").await.unwrap();

        assert_eq!(
            cache.get_url(&code).await.unwrap(),
            Some("https://example.com/page".to_string())
        );
        let record = repo.get(code.id()).await.unwrap().unwrap();
        assert_eq!(record.long_url, "https://example.com/page");
        assert_eq!(record.id, code.id());
    }

    #[tokio::test]
    async fn codes_are_distinct_across_mints() {
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(MemoryUrlCache::new()),
            Arc::new(InMemoryRepository::new()),
            TTL,
        );

        let mut codes = HashSet::new();
        for _ in 0..32 {
            let code = service.shorten("http://example.com/").await.unwrap();
            assert!(codes.insert(code.as_str().to_string()));
        }
    }

    #[tokio::test]
    async fn rejects_urls_without_http_scheme() {
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(MemoryUrlCache::new()),
            Arc::new(InMemoryRepository::new()),
            TTL,
        );

        for url in ["ftp://x", "example.com/path", "", "http:/example.com/"] {
            let err = service.shorten(url).await.unwrap_err();
            assert!(matches!(err, ShortenError::InvalidUrl(_)), "url: {url}");
        }
    }

    #[tokio::test]
    async fn rejects_urls_without_dot_or_path() {
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(MemoryUrlCache::new()),
            Arc::new(InMemoryRepository::new()),
            TTL,
        );

        // No dot in the host.
        assert!(service.shorten("http://localhost/x").await.is_err());
        // The scheme's own slashes satisfy the two-slash rule, so a bare
        // host with a dot is still accepted.
        assert!(service.shorten("https://example.com").await.is_ok());
    }

    #[tokio::test]
    async fn accepts_minimal_valid_url() {
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(MemoryUrlCache::new()),
            Arc::new(InMemoryRepository::new()),
            TTL,
        );
        assert!(service.shorten("http://example.com/").await.is_ok());
    }

    struct BrokenCache;

    #[async_trait]
    impl UrlCache for BrokenCache {
        async fn get_url(&self, _: &ShortCode) -> chute_cache::Result<Option<String>> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn set_url(&self, _: &ShortCode, _: &str, _: Duration) -> chute_cache::Result<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn cache_failure_fails_the_mint() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::new(
            allocator().await,
            Arc::new(BrokenCache),
            Arc::clone(&repo),
            TTL,
        );

        let err = service.shorten("http://example.com/").await.unwrap_err();
        assert!(matches!(err, ShortenError::Cache(_)));
        // Nothing reached the durable store either.
        assert!(repo.is_empty());
    }

    struct BrokenRepository;

    #[async_trait]
    impl ReadRepository for BrokenRepository {
        async fn get(&self, _: i64) -> chute_storage::Result<Option<UrlRecord>> {
            Err(StorageError::Unavailable("down".to_string()))
        }
    }

    #[async_trait]
    impl Repository for BrokenRepository {
        async fn save(&self, _: &UrlRecord) -> chute_storage::Result<()> {
            Err(StorageError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn durable_failure_is_tolerated_after_cache_write() {
        let cache = Arc::new(MemoryUrlCache::new());
        let service = ShortenerService::new(
            allocator().await,
            Arc::clone(&cache),
            Arc::new(BrokenRepository),
            TTL,
        );

        let code = service.shorten("http://example.com/").await.unwrap();
        assert_eq!(
            cache.get_url(&code).await.unwrap(),
            Some("http://example.com/".to_string())
        );
    }
}
