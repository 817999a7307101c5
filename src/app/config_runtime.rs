use std::net::SocketAddr;

use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use diskview_core::ClientSettings;
use diskview_core::bundle::MAX_BUNDLE_CONCURRENCY;

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Which flags were typed on the command line (as opposed to clap defaults).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) bind: bool,
    pub(crate) api_base_url: bool,
    pub(crate) connect_timeout: bool,
    pub(crate) read_timeout: bool,
    pub(crate) bundle_concurrency: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Effective server settings after merging CLI flags with the config file.
#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(crate) bind: SocketAddr,
    pub(crate) client: ClientSettings,
    pub(crate) bundle_concurrency: usize,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        bind: is_commandline_value(matches, "bind"),
        api_base_url: is_commandline_value(matches, "api_base_url"),
        connect_timeout: is_commandline_value(matches, "connect_timeout"),
        read_timeout: is_commandline_value(matches, "read_timeout"),
        bundle_concurrency: is_commandline_value(matches, "bundle_concurrency"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills every flag the user did not type from the config file.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<Args> {
    if let Some(file_config) = file_config {
        if !cli_sources.bind
            && let Some(bind) = file_config.bind
        {
            args.bind = bind;
        }

        if !cli_sources.api_base_url
            && let Some(base_url) = &file_config.api_base_url
        {
            args.api_base_url.clone_from(base_url);
        }

        if !cli_sources.connect_timeout
            && let Some(secs) = file_config.connect_timeout_secs
        {
            args.connect_timeout = secs;
        }

        if !cli_sources.read_timeout
            && let Some(secs) = file_config.read_timeout_secs
        {
            args.read_timeout = secs;
        }

        if !cli_sources.bundle_concurrency
            && let Some(concurrency) = file_config.bundle_concurrency
        {
            args.bundle_concurrency = concurrency;
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut args, verbosity);
        }
    }

    if !(1..=MAX_BUNDLE_CONCURRENCY).contains(&usize::from(args.bundle_concurrency)) {
        bail!(
            "Invalid effective bundle_concurrency value: {}. Expected range: 1..={MAX_BUNDLE_CONCURRENCY}",
            args.bundle_concurrency
        );
    }

    Ok(args)
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

pub(crate) fn server_settings(args: &Args) -> ServerSettings {
    ServerSettings {
        bind: args.bind,
        client: ClientSettings {
            base_url: args.api_base_url.clone(),
            connect_timeout_secs: args.connect_timeout,
            read_timeout_secs: args.read_timeout,
        },
        bundle_concurrency: usize::from(args.bundle_concurrency),
    }
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

pub(crate) fn verbosity_label(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        VerbositySetting::Quiet.as_str()
    } else if verbose == 0 {
        VerbositySetting::Default.as_str()
    } else if verbose == 1 {
        VerbositySetting::Verbose.as_str()
    } else {
        VerbositySetting::Debug.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> (Args, CliValueSources) {
        let matches = Args::command()
            .try_get_matches_from(argv)
            .expect("test args should parse");
        let args = Args::from_arg_matches(&matches).expect("args from matches");
        (args, sources_from_matches(&matches))
    }

    fn sample_config() -> FileConfig {
        FileConfig {
            bind: Some("0.0.0.0:8080".parse().expect("addr")),
            api_base_url: Some("http://127.0.0.1:9000/resources".to_string()),
            connect_timeout_secs: Some(3),
            read_timeout_secs: Some(60),
            bundle_concurrency: Some(4),
            verbosity: Some(VerbositySetting::Quiet),
        }
    }

    #[test]
    fn test_defaults_without_config() {
        let (args, sources) = parse(&["diskview"]);
        let args = apply_config_defaults(args, &sources, None).expect("defaults valid");
        let settings = server_settings(&args);
        assert_eq!(settings.bind.port(), 5000);
        assert_eq!(settings.bundle_concurrency, 1);
        assert_eq!(resolve_default_log_level(&args), "info");
    }

    #[test]
    fn test_config_fills_flags_not_given() {
        let (args, sources) = parse(&["diskview"]);
        let config = sample_config();
        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid");

        assert_eq!(args.bind.port(), 8080);
        assert_eq!(args.api_base_url, "http://127.0.0.1:9000/resources");
        assert_eq!(args.connect_timeout, 3);
        assert_eq!(args.read_timeout, 60);
        assert_eq!(args.bundle_concurrency, 4);
        assert!(args.quiet);
        assert_eq!(resolve_default_log_level(&args), "error");
    }

    #[test]
    fn test_cli_flags_win_over_config() {
        let (args, sources) = parse(&["diskview", "--bind", "127.0.0.1:7000", "-c", "2", "-v"]);
        let config = sample_config();
        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid");

        assert_eq!(args.bind.port(), 7000);
        assert_eq!(args.bundle_concurrency, 2);
        assert!(!args.quiet);
        assert_eq!(args.verbose, 1);
        assert_eq!(args.read_timeout, 60);
    }

    #[test]
    fn test_explicit_default_value_still_wins() {
        let (args, sources) = parse(&["diskview", "--bundle-concurrency", "1"]);
        let config = sample_config();
        let args = apply_config_defaults(args, &sources, Some(&config)).expect("valid");
        assert_eq!(args.bundle_concurrency, 1);
    }

    #[test]
    fn test_invalid_effective_concurrency_rejected() {
        let (args, sources) = parse(&["diskview"]);
        let config = FileConfig {
            bundle_concurrency: Some(40),
            ..FileConfig::default()
        };
        let err = apply_config_defaults(args, &sources, Some(&config)).expect_err("out of range");
        assert!(err.to_string().contains("bundle_concurrency"));
    }

    #[test]
    fn test_log_level_forcing() {
        let (_, sources) = parse(&["diskview"]);
        assert!(!should_force_cli_log_level(&sources));
        let (_, sources) = parse(&["diskview", "-q"]);
        assert!(should_force_cli_log_level(&sources));
    }

    #[test]
    fn test_verbosity_label() {
        assert_eq!(verbosity_label(0, false), "default");
        assert_eq!(verbosity_label(1, false), "verbose");
        assert_eq!(verbosity_label(3, false), "debug");
        assert_eq!(verbosity_label(2, true), "quiet");
    }
}
