//! Application configuration loading for CLI defaults.

use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use diskview_core::bundle::MAX_BUNDLE_CONCURRENCY;

/// TOML-style file configuration for server defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Listen address.
    pub bind: Option<SocketAddr>,
    /// Public-resources listing endpoint.
    pub api_base_url: Option<String>,
    /// Provider connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Provider request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Files fetched at once when building a zip bundle.
    pub bundle_concurrency: Option<u8>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.bundle_concurrency
            && !(1..=MAX_BUNDLE_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `bundle_concurrency`: {concurrency}. Expected range: 1..={MAX_BUNDLE_CONCURRENCY}"
            );
        }
        if let Some(base_url) = &self.api_base_url {
            url::Url::parse(base_url).with_context(|| {
                format!("Invalid config value for `api_base_url`: '{base_url}'")
            })?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    const ALL: [Self; 4] = [Self::Default, Self::Verbose, Self::Quiet, Self::Debug];

    /// Looks up a mode by the label written in the config file.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == label)
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Config path that was consulted, if any.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Whether configuration was loaded from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/diskview/config.toml`
/// 2. `$HOME/.config/diskview/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("diskview")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("diskview")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file named by `--config`, or the default one if present.
///
/// An explicit path must exist; a missing default file is not an error.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = without_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected `key = value`");
        };
        let setting = Setting {
            key: key.trim(),
            value: value.trim(),
            line_no,
        };

        match setting.key {
            "bind" => cfg.bind = Some(setting.socket_addr()?),
            "api_base_url" => cfg.api_base_url = Some(setting.quoted()?.to_string()),
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(setting.number()?),
            "read_timeout_secs" => cfg.read_timeout_secs = Some(setting.number()?),
            "bundle_concurrency" => cfg.bundle_concurrency = Some(setting.number()?),
            "verbosity" => cfg.verbosity = Some(setting.verbosity()?),
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Drops a trailing `# comment`; a `#` inside a quoted value is kept.
fn without_comment(line: &str) -> &str {
    line.match_indices('#')
        .find(|(index, _)| line[..*index].matches('"').count() % 2 == 0)
        .map_or(line, |(index, _)| &line[..index])
}

/// One `key = value` line of the config file.
struct Setting<'a> {
    key: &'a str,
    value: &'a str,
    line_no: usize,
}

impl Setting<'_> {
    fn invalid(&self, reason: impl fmt::Display) -> anyhow::Error {
        anyhow!("Invalid `{}` on line {}: {reason}", self.key, self.line_no)
    }

    fn quoted(&self) -> Result<&str> {
        self.value
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| self.invalid(format!("expected a double-quoted string, got {}", self.value)))
    }

    fn number<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.value
            .parse::<T>()
            .map_err(|error| self.invalid(format!("'{}' is not a valid number ({error})", self.value)))
    }

    fn socket_addr(&self) -> Result<SocketAddr> {
        let text = self.quoted()?;
        text.parse::<SocketAddr>()
            .map_err(|_| self.invalid(format!("expected host:port, got '{text}'")))
    }

    fn verbosity(&self) -> Result<VerbositySetting> {
        let label = self.quoted()?;
        VerbositySetting::from_label(label).ok_or_else(|| {
            self.invalid(format!(
                "unknown mode '{label}', expected one of: default, verbose, quiet, debug"
            ))
        })
    }
}
