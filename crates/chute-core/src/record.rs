use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored URL mapping.
///
/// `id` is the allocator-issued global ID (the decoded short code) and the
/// primary key in the durable store. `created_at` is wall-clock at mint
/// time; it is informational and never used for ordering or expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    pub created_at: Timestamp,
}

impl UrlRecord {
    /// Creates a record stamped with the current wall clock.
    pub fn new(id: i64, long_url: impl Into<String>) -> Self {
        Self {
            id,
            long_url: long_url.into(),
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_current_time() {
        let before = Timestamp::now();
        let record = UrlRecord::new(42, "https://example.com/");
        let after = Timestamp::now();

        assert_eq!(record.id, 42);
        assert_eq!(record.long_url, "https://example.com/");
        assert!(record.created_at >= before && record.created_at <= after);
    }
}
