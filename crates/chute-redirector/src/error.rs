use chute_core::ShortCodeError;
use chute_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by the redirect path.
///
/// Cache failures never appear here: the redirector treats them as
/// misses and falls through to the durable store.
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("invalid short code: {0}")]
    InvalidCode(#[from] ShortCodeError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
