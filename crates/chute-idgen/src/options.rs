use serde::Deserialize;
use std::time::Duration;
use typed_builder::TypedBuilder;

fn default_segment_size() -> usize {
    100_000
}

fn default_queue_threshold() -> f32 {
    0.2
}

fn default_segment_count_key() -> String {
    "chute/idalloc/count".to_string()
}

fn default_segment_map_key() -> String {
    "chute/idalloc/map".to_string()
}

fn default_max_segment_count() -> u32 {
    // 35M segments of 100k IDs stay inside the 62^7 code space.
    35_000_000
}

/// Configures the segment scheme and the per-replica ID queue.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct IdAllocOptions {
    /// Number of local offsets per segment.
    #[serde(default = "default_segment_size")]
    #[builder(default = default_segment_size())]
    pub segment_size: usize,
    /// Fraction of `segment_size` at which the next segment is prefetched.
    /// Must lie in `(0, 1)`.
    #[serde(default = "default_queue_threshold")]
    #[builder(default = default_queue_threshold())]
    pub queue_threshold: f32,
    /// Store key holding the remaining pool size.
    #[serde(default = "default_segment_count_key")]
    #[builder(default = default_segment_count_key())]
    pub segment_count_key: String,
    /// Store key prefix for the sparse Fisher–Yates remap entries.
    #[serde(default = "default_segment_map_key")]
    #[builder(default = default_segment_map_key())]
    pub segment_map_key: String,
    /// Total number of segments the pool starts with.
    #[serde(default = "default_max_segment_count")]
    #[builder(default = default_max_segment_count())]
    pub max_segment_count: u32,
}

impl Default for IdAllocOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_etcd_address() -> String {
    "http://127.0.0.1:2379".to_string()
}

fn default_etcd_connect_timeout() -> u64 {
    5
}

fn default_etcd_request_timeout() -> u64 {
    3
}

/// Connection settings for the etcd coordination store.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct EtcdOptions {
    #[serde(default = "default_etcd_address")]
    #[builder(default = default_etcd_address())]
    pub address: String,
    /// Dial timeout, in seconds.
    #[serde(rename = "connect_timeout", default = "default_etcd_connect_timeout")]
    #[builder(default = default_etcd_connect_timeout())]
    pub connect_timeout_secs: u64,
    /// Deadline applied to every store round trip, in seconds.
    #[serde(rename = "request_timeout", default = "default_etcd_request_timeout")]
    #[builder(default = default_etcd_request_timeout())]
    pub request_timeout_secs: u64,
}

impl Default for EtcdOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EtcdOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
