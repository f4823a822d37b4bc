use crate::error::RedirectError;
use async_trait::async_trait;
use chute_cache::UrlCache;
use chute_core::ShortCode;
use chute_storage::ReadRepository;
use std::sync::Arc;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, RedirectError>;

/// The redirect operation, as the HTTP edge sees it.
#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a raw short code to its long URL.
    /// Returns `None` when neither tier knows the code.
    async fn resolve(&self, code: &str) -> Result<Option<String>>;
}

/// A concrete [`Redirector`] over the hot cache and the durable store.
pub struct RedirectorService<C, R> {
    cache: Arc<C>,
    repository: Arc<R>,
}

impl<C: UrlCache, R: ReadRepository> RedirectorService<C, R> {
    pub fn new(cache: Arc<C>, repository: Arc<R>) -> Self {
        Self { cache, repository }
    }
}

#[async_trait]
impl<C: UrlCache, R: ReadRepository> Redirector for RedirectorService<C, R> {
    async fn resolve(&self, code: &str) -> Result<Option<String>> {
        let code = ShortCode::parse(code)?;
        trace!(code = %code, "resolving short code");

        match self.cache.get_url(&code).await {
            Ok(Some(long_url)) => {
                debug!(code = %code, "resolved from cache");
                return Ok(Some(long_url));
            }
            Ok(None) => {}
            // A flaky cache must not take redirects down while the
            // durable store still has the record.
            Err(e) => warn!(code = %code, error = %e, "cache lookup failed; falling through"),
        }

        match self.repository.get(code.id()).await? {
            Some(record) => {
                debug!(code = %code, "resolved from durable store");
                Ok(Some(record.long_url))
            }
            None => {
                trace!(code = %code, "short code not found in either tier");
                Ok(None)
            }
        }
    }
}
