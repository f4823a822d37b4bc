use chute_cache::RedisCacheOptions;
use chute_idgen::{EtcdOptions, IdAllocOptions};
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

/// Shortener configuration, loaded from a TOML file.
///
/// Sections mirror the components: `[id_alloc]`, `[etcd]`, `[redis]`,
/// `[cassandra]`. Every key has a default, so an empty file is valid;
/// endpoint and secret environment variables override the file afterwards
/// via [`Config::apply_env_overrides`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub id_alloc: IdAllocOptions,
    #[serde(default)]
    pub etcd: EtcdOptions,
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
    /// secrets. File values stay in place for everything unset.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var("ETCD_ADDRESS") {
            self.etcd.address = address;
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.id_alloc.segment_size, 100_000);
        assert_eq!(config.etcd.address, "http://127.0.0.1:2379");
        assert_eq!(config.redis.master_name, "mymaster");
        assert_eq!(config.cassandra.keyspace, "chute");
    }

    #[test]
    fn sections_parse() {
        let config: Config = toml::from_str(
            r#"
            [id_alloc]
            segment_size = 500
            queue_threshold = 0.25
            max_segment_count = 1000

            [etcd]
            address = "http://etcd:2379"
            request_timeout = 2

            [redis]
            sentinel_address = "redis://sentinel:26379"
            ttl = 3600

            [cassandra]
            hosts = ["cass-1:9042", "cass-2:9042"]
            keyspace = "urls"
            "#,
        )
        .unwrap();

        assert_eq!(config.id_alloc.segment_size, 500);
        assert_eq!(config.id_alloc.queue_threshold, 0.25);
        assert_eq!(config.etcd.request_timeout_secs, 2);
        assert_eq!(config.redis.ttl_secs, 3600);
        assert_eq!(config.cassandra.hosts.len(), 2);
        assert_eq!(config.cassandra.keyspace, "urls");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[id_alloc]\nsegment_sizes = 3\n").is_err());
    }
}
