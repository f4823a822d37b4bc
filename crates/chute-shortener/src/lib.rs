//! Shortener service: mints short codes for long URLs.
//!
//! The create path runs validate → allocate ID → encode → cache write →
//! best-effort durable write. Only the cache write can fail a request
//! once an ID is allocated; a lost durable write is logged and left to
//! out-of-band reconciliation while the cache serves the record.

pub mod config;
pub mod error;
pub mod http;
pub mod service;

pub use config::Config;
pub use error::ShortenError;
pub use service::{Shortener, ShortenerService};
