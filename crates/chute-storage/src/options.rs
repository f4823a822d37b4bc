use serde::Deserialize;
use std::time::Duration;
use typed_builder::TypedBuilder;

fn default_hosts() -> Vec<String> {
    vec!["127.0.0.1:9042".to_string()]
}

fn default_keyspace() -> String {
    "chute".to_string()
}

fn default_timeout() -> u64 {
    3
}

fn default_connect_timeout() -> u64 {
    5
}

/// Connection settings for the Cassandra cluster.
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct CassandraOptions {
    /// Contact points, `host:port`.
    #[serde(default = "default_hosts")]
    #[builder(default = default_hosts())]
    pub hosts: Vec<String>,
    #[serde(default = "default_keyspace")]
    #[builder(default = default_keyspace())]
    pub keyspace: String,
    /// Per-request deadline, in seconds.
    #[serde(rename = "timeout", default = "default_timeout")]
    #[builder(default = default_timeout())]
    pub timeout_secs: u64,
    /// Connect-time deadline, in seconds.
    #[serde(rename = "connect_timeout", default = "default_connect_timeout")]
    #[builder(default = default_connect_timeout())]
    pub connect_timeout_secs: u64,
}

impl Default for CassandraOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CassandraOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
