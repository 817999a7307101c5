//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use diskview_core::bundle::{DEFAULT_BUNDLE_CONCURRENCY, MAX_BUNDLE_CONCURRENCY};
use diskview_core::disk::{
    DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Browse and download files shared through Yandex Disk public links.
///
/// Diskview serves a small web UI that lists public folders, filters them by
/// file type and downloads single files or zip bundles.
#[derive(Parser, Debug)]
#[command(name = "diskview")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to listen on
    #[arg(short = 'b', long, default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Public-resources listing endpoint
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// HTTP connect timeout for provider requests in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// HTTP request timeout for provider requests in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,

    /// Files fetched at once when building a zip bundle (1-16)
    #[arg(short = 'c', long, default_value_t = DEFAULT_BUNDLE_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=MAX_BUNDLE_CONCURRENCY as i64))]
    pub bundle_concurrency: u8,

    /// Config file (defaults to $XDG_CONFIG_HOME/diskview/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub check_config: bool,
}
