//! Log output for the server process.

use tracing_subscriber::EnvFilter;

/// Connection-pool chatter from the HTTP stack, kept at warn so `-v` shows
/// request handling rather than socket reuse.
const QUIET_TRANSPORT: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

/// Builds the log filter. `RUST_LOG` wins unless `-v`/`-q` were typed.
pub(crate) fn log_filter(level: &str, force_cli_level: bool) -> EnvFilter {
    if !force_cli_level && let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    if level == "error" {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(format!("{level},{QUIET_TRANSPORT}"))
    }
}

/// Colors stay on unless `NO_COLOR` is set to a non-empty value.
pub(crate) fn ansi_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none_or(|value| value.is_empty())
}

/// Installs the global stderr subscriber; a second call is ignored.
pub(crate) fn init_tracing(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled())
        .with_env_filter(filter)
        .try_init();
}
