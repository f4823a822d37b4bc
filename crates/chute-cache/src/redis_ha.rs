use crate::cache::UrlCache;
use crate::error::{CacheError, Result};
use crate::options::RedisCacheOptions;
use async_trait::async_trait;
use chute_core::ShortCode;
use deadpool_redis::redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// A Redis Sentinel-based high-availability implementation of [`UrlCache`].
///
/// Writes go to the master pool, reads to the replica pool, so redirect
/// traffic scales out while failover stays transparent. Keys are the bare
/// short code and values the bare long URL, matching what the redirector
/// needs on its fast path.
#[derive(Debug, Clone)]
pub struct RedisHAUrlCache {
    master_pool: deadpool_redis::sentinel::Pool,
    replica_pool: deadpool_redis::sentinel::Pool,
    op_timeout: Duration,
}

fn map_redis_error(operation: &str, err: deadpool_redis::redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else {
        CacheError::Operation(message)
    }
}

fn map_pool_error(operation: &str, err: impl std::fmt::Display) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else {
        CacheError::Unavailable(message)
    }
}

/// Injects the configured password into a sentinel URL's userinfo so the
/// resolved master and replica connections authenticate.
fn with_password(url: &str, password: &str) -> String {
    if password.is_empty() {
        return url.to_string();
    }
    match url.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://:{password}@{rest}"),
        None => url.to_string(),
    }
}

impl RedisHAUrlCache {
    /// Creates the master and replica pools from the sentinel address.
    ///
    /// This only builds the pools; call [`Self::ping`] afterwards to fail
    /// fast when the cache is unreachable at startup.
    pub fn new(options: &RedisCacheOptions) -> Result<Self> {
        let url = with_password(&options.sentinel_address, &options.password);

        let master_config = deadpool_redis::sentinel::Config::from_urls(
            vec![url.clone()],
            options.master_name.clone(),
            deadpool_redis::sentinel::SentinelServerType::Master,
        );
        let master_pool = master_config.create_pool(None).map_err(|e| {
            CacheError::Initialization(format!("failed to create master pool: {e}"))
        })?;

        let replica_config = deadpool_redis::sentinel::Config::from_urls(
            vec![url],
            options.master_name.clone(),
            deadpool_redis::sentinel::SentinelServerType::Replica,
        );
        let replica_pool = replica_config.create_pool(None).map_err(|e| {
            CacheError::Initialization(format!("failed to create replica pool: {e}"))
        })?;

        info!(
            sentinel = %options.sentinel_address,
            master = %options.master_name,
            "configured Redis Sentinel cache pools"
        );

        Ok(Self {
            master_pool,
            replica_pool,
            op_timeout: options.set_timeout(),
        })
    }

    /// Round-trips a PING through the master pool under the configured
    /// deadline. Used at startup to surface a dead cache as a fatal error.
    pub async fn ping(&self, deadline: Duration) -> Result<()> {
        let fut = async {
            let mut conn = self
                .master_pool
                .get()
                .await
                .map_err(|e| map_pool_error("failed to get master connection", e))?;
            deadpool_redis::redis::cmd("PING")
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| map_redis_error("ping failed", e))
        };
        timed(deadline, "ping", fut).await?
    }
}

/// Applies a hard deadline on top of whatever timeouts the pool enforces.
async fn timed<T>(
    deadline: Duration,
    operation: &str,
    fut: impl Future<Output = T>,
) -> Result<T> {
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| CacheError::Timeout(format!("{operation} exceeded {deadline:?}")))
}

#[async_trait]
impl UrlCache for RedisHAUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "fetching long URL from Redis (replica)");

        let fut = async {
            let mut conn = self
                .replica_pool
                .get()
                .await
                .map_err(|e| map_pool_error("failed to get replica connection", e))?;
            conn.get::<_, Option<String>>(code.as_str())
                .await
                .map_err(|e| map_redis_error("failed to fetch value from replica", e))
        };

        match timed(self.op_timeout, "get", fut).await? {
            Ok(Some(long_url)) => {
                debug!(code = %code, "cache hit");
                Ok(Some(long_url))
            }
            Ok(None) => {
                trace!(code = %code, "cache miss");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache read failed");
                Err(e)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, "storing long URL in Redis (master)");

        let fut = async {
            let mut conn = self
                .master_pool
                .get()
                .await
                .map_err(|e| map_pool_error("failed to get master connection", e))?;
            conn.set_ex::<_, _, ()>(code.as_str(), long_url, ttl.as_secs())
                .await
                .map_err(|e| map_redis_error("failed to write value to master", e))
        };

        match timed(self.op_timeout, "set", fut).await? {
            Ok(()) => {
                debug!(code = %code, ttl_secs = ttl.as_secs(), "cached mapping");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache write failed");
                Err(e)
            }
        }
    }
}
