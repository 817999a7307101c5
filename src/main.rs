//! CLI entry point for the diskview server.

use anyhow::Result;

mod app;
mod app_config;
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    app::runtime::run_server().await
}
