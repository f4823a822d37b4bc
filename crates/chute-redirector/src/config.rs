use chute_cache::RedisCacheOptions;
use chute_storage::CassandraOptions;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Redirector configuration, loaded from a TOML file.
///
/// The redirector only reads, so it needs the `[redis]` and `[cassandra]`
/// sections; the allocator sections belong to the shortener's file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub redis: RedisCacheOptions,
    #[serde(default)]
    pub cassandra: CassandraOptions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies the deployment-environment overrides for endpoints and
    /// secrets.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var("REDIS_SENTINEL_ADDRESS") {
            self.redis.sentinel_address = address;
        }
        if let Ok(master) = std::env::var("REDIS_MASTER_NAME") {
            self.redis.master_name = master;
        }
        if let Ok(password) = std::env::var("REDIS_PASSWORD") {
            self.redis.password = password;
        }
        if let Ok(hosts) = std::env::var("CASSANDRA_HOSTS") {
            self.cassandra.hosts = hosts.split(',').map(str::to_string).collect();
        }
        if let Ok(keyspace) = std::env::var("CASSANDRA_KEYSPACE") {
            self.cassandra.keyspace = keyspace;
        }
    }
}
