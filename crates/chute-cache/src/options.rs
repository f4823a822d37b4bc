use serde::Deserialize;
use std::time::Duration;
use typed_builder::TypedBuilder;

fn default_sentinel_address() -> String {
    "redis://127.0.0.1:26379".to_string()
}

fn default_master_name() -> String {
    "mymaster".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_set_timeout() -> u64 {
    3
}

fn default_ttl() -> u64 {
    // Cached mappings outlive any plausible durable-store catch-up window.
    24 * 60 * 60
}

/// Connection settings for the Redis Sentinel hot cache.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct RedisCacheOptions {
    /// Sentinel address, e.g. `redis://sentinel:26379`.
    #[serde(default = "default_sentinel_address")]
    #[builder(default = default_sentinel_address())]
    pub sentinel_address: String,
    /// Name of the monitored master the sentinels report.
    #[serde(default = "default_master_name")]
    #[builder(default = default_master_name())]
    pub master_name: String,
    /// Password for the Redis servers; empty means no auth.
    #[serde(default)]
    #[builder(default)]
    pub password: String,
    /// Connect-time deadline, in seconds.
    #[serde(rename = "connect_timeout", default = "default_connect_timeout")]
    #[builder(default = default_connect_timeout())]
    pub connect_timeout_secs: u64,
    /// Per-operation deadline, in seconds.
    #[serde(rename = "set_timeout", default = "default_set_timeout")]
    #[builder(default = default_set_timeout())]
    pub set_timeout_secs: u64,
    /// Entry lifetime, in seconds.
    #[serde(rename = "ttl", default = "default_ttl")]
    #[builder(default = default_ttl())]
    pub ttl_secs: u64,
}

impl Default for RedisCacheOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RedisCacheOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn set_timeout(&self) -> Duration {
        Duration::from_secs(self.set_timeout_secs)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let options = RedisCacheOptions::builder().build();
        assert_eq!(options.master_name, "mymaster");
        assert_eq!(options.ttl(), Duration::from_secs(86_400));
        assert_eq!(options.set_timeout(), Duration::from_secs(3));
        assert!(options.password.is_empty());
    }
}
