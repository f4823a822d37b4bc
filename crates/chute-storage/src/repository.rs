use crate::error::Result;
use async_trait::async_trait;
use chute_core::UrlRecord;

/// Read-only view of the durable store, all the redirector needs.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Fetches the record for a global ID. Returns `None` if no URL was
    /// ever minted with that ID (or its write was lost; the cache covers
    /// that window).
    async fn get(&self, id: i64) -> Result<Option<UrlRecord>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a freshly minted record. IDs are unique by construction,
    /// so this is a blind write with no conflict handling.
    async fn save(&self, record: &UrlRecord) -> Result<()>;
}
