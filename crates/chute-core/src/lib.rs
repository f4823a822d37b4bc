//! Core types for the Chute URL shortener.
//!
//! This crate provides the short-code codec and the stored URL record
//! shared by the shortener service and the redirector service.

pub mod record;
pub mod shortcode;

pub use record::UrlRecord;
pub use shortcode::{ShortCode, ShortCodeError, SHORT_CODE_LEN};
