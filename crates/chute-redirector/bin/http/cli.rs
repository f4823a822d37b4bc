use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "CHUTE_REDIRECTOR_LISTEN_ADDR";
pub const CONFIG_PATH_ENV: &str = "CHUTE_REDIRECTOR_CONFIG";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8081";

#[derive(Debug, Parser)]
#[command(name = "chute-redirector")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Path to the TOML configuration file.
    #[arg(long, env = CONFIG_PATH_ENV, default_value = "config.toml")]
    pub config: PathBuf,
}
