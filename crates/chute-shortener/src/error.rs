use chute_cache::CacheError;
use chute_core::ShortCodeError;
use chute_idgen::AllocError;
use thiserror::Error;

/// Errors surfaced by the create path.
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("id allocation failed: {0}")]
    Alloc(#[from] AllocError),
    #[error("short code encoding failed: {0}")]
    Codec(#[from] ShortCodeError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}
