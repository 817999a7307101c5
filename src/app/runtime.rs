use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{debug, info};

use diskview_core::{AppState, ListingCache, YandexDiskClient, router};

use crate::app::config_runtime::{self, ServerSettings};
use crate::app::terminal;
use crate::app_config::{LoadedConfig, load_config};

pub(crate) async fn run_server() -> Result<()> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let loaded = load_config(args.config.as_deref())?;
    let args = config_runtime::apply_config_defaults(args, &cli_sources, loaded.config.as_ref())?;

    let default_level = config_runtime::resolve_default_log_level(&args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    terminal::init_tracing(terminal::log_filter(default_level, force_cli_log_level));

    debug!(?args, "CLI arguments parsed");
    let settings = config_runtime::server_settings(&args);

    if args.check_config {
        print!(
            "{}",
            render_effective_config(
                &settings,
                &loaded,
                config_runtime::verbosity_label(args.verbose, args.quiet)
            )
        );
        return Ok(());
    }

    serve(settings).await
}

async fn serve(settings: ServerSettings) -> Result<()> {
    let client = YandexDiskClient::with_settings(settings.client.clone())
        .context("Failed to create disk client")?;
    let cache = Arc::new(ListingCache::new());
    let state = AppState::new(Arc::new(client), Arc::clone(&cache))
        .with_bundle_concurrency(settings.bundle_concurrency);

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    let local_addr = listener.local_addr().context("Failed to read bound address")?;
    info!(
        addr = %local_addr,
        api_base_url = %settings.client.base_url,
        bundle_concurrency = settings.bundle_concurrency,
        "diskview listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!(
        cached_listings = cache.len(),
        cache_hits = cache.hits(),
        cache_misses = cache.misses(),
        "diskview stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

fn render_effective_config(
    settings: &ServerSettings,
    loaded: &LoadedConfig,
    verbosity: &str,
) -> String {
    let source = match (&loaded.path, loaded.loaded_from_file()) {
        (Some(path), true) => path.display().to_string(),
        (Some(path), false) => format!("{} (not found, using defaults)", path.display()),
        (None, _) => "none".to_string(),
    };
    format!(
        "config_file = \"{source}\"\n\
         bind = \"{}\"\n\
         api_base_url = \"{}\"\n\
         connect_timeout_secs = {}\n\
         read_timeout_secs = {}\n\
         bundle_concurrency = {}\n\
         verbosity = \"{verbosity}\"\n",
        settings.bind,
        settings.client.base_url,
        settings.client.connect_timeout_secs,
        settings.client.read_timeout_secs,
        settings.bundle_concurrency,
    )
}
