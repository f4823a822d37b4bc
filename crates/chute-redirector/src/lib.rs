//! Redirector service: resolves short codes back to long URLs.
//!
//! Lookups hit the hot cache first; a miss (or a cache error, which is
//! treated as a miss) falls through to the durable store keyed by the
//! decoded ID. The baseline does not back-fill the cache on a durable
//! hit.

pub mod config;
pub mod error;
pub mod http;
pub mod service;

pub use config::Config;
pub use error::RedirectError;
pub use service::{Redirector, RedirectorService};
