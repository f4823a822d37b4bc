mod cli;

use crate::cli::Cli;
use chute_cache::RedisHAUrlCache;
use chute_redirector::http::{app, AppState};
use chute_redirector::{Config, RedirectorService};
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

    let cache = RedisHAUrlCache::new(&config.redis)?;
    cache.ping(config.redis.connect_timeout()).await?;

    let repository = Arc::new(CassandraRepository::connect(&config.cassandra).await?);

    let service = RedirectorService::new(Arc::new(cache), repository);
    let state = AppState {
        redirector: Arc::new(service),
    };

    let listener = tokio::net::TcpListener::bind(cli.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "starting redirector HTTP server");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
