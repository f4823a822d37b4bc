use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "CHUTE_SHORTENER_LISTEN_ADDR";
pub const CONFIG_PATH_ENV: &str = "CHUTE_SHORTENER_CONFIG";
pub const BASE_URL_ENV: &str = "CHUTE_BASE_URL";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "chute-shortener")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Path to the TOML configuration file.
    #[arg(long, env = CONFIG_PATH_ENV, default_value = "config.toml")]
    pub config: PathBuf,

    /// Public base URL rendered into create responses.
    #[arg(long, env = BASE_URL_ENV, default_value = "http://127.0.0.1:8080")]
    pub base_url: String,
}
