use thiserror::Error;

/// Errors returned by segment and ID allocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocError {
    /// The shared segment pool has no segments left. Terminal for the
    /// whole cluster, not just this replica.
    #[error("segment pool exhausted")]
    Exhausted,
    /// The front queue drained before a prefetched segment was published.
    /// Transient: the caller may retry once the prefetch lands.
    #[error("id queue empty and no staged segment available")]
    Starved,
    #[error("coordination store unavailable: {0}")]
    StoreUnavailable(String),
    /// Non-integer bytes in the pool state. Requires manual recovery.
    #[error("corrupt value in coordination store: {0}")]
    CorruptValue(String),
    #[error("invalid allocator options: {0}")]
    InvalidOptions(String),
    #[error("allocator state lock is poisoned")]
    StatePoisoned,
}
