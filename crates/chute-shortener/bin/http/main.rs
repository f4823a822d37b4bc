mod cli;

use crate::cli::Cli;
use chute_cache::RedisHAUrlCache;
use chute_idgen::{EtcdStore, IdAllocator};
use chute_shortener::http::{app, AppState};
use chute_shortener::{Config, ShortenerService};
use chute_storage::CassandraRepository;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::try_parse()?;
    let mut config = Config::load(&cli.config)?;
    config.apply_env_overrides();

    let store = Arc::new(EtcdStore::connect(&config.etcd).await?);
    let allocator = IdAllocator::bootstrap(store, &config.id_alloc).await?;

    let cache = RedisHAUrlCache::new(&config.redis)?;
    cache.ping(config.redis.connect_timeout()).await?;

    let repository = Arc::new(CassandraRepository::connect(&config.cassandra).await?);

    let cache_ttl = config.redis.ttl();
    let service = ShortenerService::new(allocator, Arc::new(cache), repository, cache_ttl);
    let state = AppState {
        shortener: Arc::new(service),
        base_url: cli.base_url.clone(),
    };

    let listener = tokio::net::TcpListener::bind(cli.listen_addr).await?;
    info!(
        listen_addr = %listener.local_addr()?,
        base_url = %cli.base_url,
        "starting shortener HTTP server"
    );
    axum::serve(listener, app(state)).await?;

    Ok(())
}
