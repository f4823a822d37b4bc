use crate::error::AllocError;
use async_trait::async_trait;

/// Result type for coordination-store operations.
pub type Result<T> = std::result::Result<T, AllocError>;

/// The key/value operations the segment allocator needs from a strongly
/// consistent store.
///
/// The production implementation is [`EtcdStore`](crate::EtcdStore);
/// [`MemoryStore`](crate::MemoryStore) provides the same linearizable
/// semantics in process for tests and race harnesses.
#[async_trait]
pub trait CoordinationStore: Send + Sync + 'static {
    /// Reads the raw bytes stored at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes `value` at `key` unconditionally.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Atomically applies every `(key, value)` in `puts`, but only if
    /// `guard_key` currently holds exactly `expected`, byte for byte.
    ///
    /// Returns `false` when the guard comparison fails and nothing was
    /// written.
    async fn compare_and_put(
        &self,
        guard_key: &str,
        expected: &[u8],
        puts: &[(String, String)],
    ) -> Result<bool>;
}
