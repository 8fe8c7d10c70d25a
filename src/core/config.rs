//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.docent/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::client::DEFAULT_AUTH_SCHEME;
use crate::core::chat::DEFAULT_FAILURE_MESSAGE;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub failure_message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub auth_scheme: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub redirect_uri: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/auth/callback";
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub auth_scheme: String,
    pub redirect_uri: String,
    pub log_level: String,
    pub failure_message: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&DocentConfig::default(), None, |_| None)
    }
}

impl ResolvedConfig {
    /// Log filter for `log_level`; unknown names fall back to `Info`.
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.docent`, home of the config file, the log and the token store.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".docent"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Where the loaded config came from.
///
/// Loading happens before the logger exists (the log level lives in the
/// config), so the outcome is returned and logged by the caller afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Generated(PathBuf),
    GenerateFailed { path: PathBuf, reason: String },
    NoHomeDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                info!("No config file found, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, reason } => warn!(
                "No config file found, could not write default to {}: {}",
                path.display(),
                reason
            ),
            ConfigSource::NoHomeDir => {
                warn!("Could not determine home directory, using default config")
            }
        }
    }
}

/// Load config from `~/.docent/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DocentConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<(DocentConfig, ConfigSource), ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok((DocentConfig::default(), ConfigSource::NoHomeDir)),
    }
}

pub fn load_config_from(path: &Path) -> Result<(DocentConfig, ConfigSource), ConfigError> {
    if !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated(path.to_path_buf()),
            Err(e) => ConfigSource::GenerateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        };
        return Ok((DocentConfig::default(), source));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DocentConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

const DEFAULT_CONFIG_FILE: &str = r#"# Docent Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "info"                 # "error", "warn", "info", "debug", "trace"
# failure_message = "Sorry, I encountered an error."

# [backend]
# base_url = "http://localhost:8000/api"   # Or DOCENT_BASE_URL / --base-url
# auth_scheme = "Token"                    # "Token" (DRF) or "Bearer"

# [auth]
# redirect_uri = "http://localhost:3000/auth/callback"   # Or DOCENT_REDIRECT_URI
"#;

fn generate_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_FILE)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DocentConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_base_url, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &DocentConfig,
    cli_base_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env("DOCENT_BASE_URL"))
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let auth_scheme = env("DOCENT_AUTH_SCHEME")
        .or_else(|| config.backend.auth_scheme.clone())
        .unwrap_or_else(|| DEFAULT_AUTH_SCHEME.to_string());

    let redirect_uri = env("DOCENT_REDIRECT_URI")
        .or_else(|| config.auth.redirect_uri.clone())
        .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

    let log_level = env("DOCENT_LOG")
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    ResolvedConfig {
        base_url,
        auth_scheme,
        redirect_uri,
        log_level,
        failure_message: config
            .general
            .failure_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&DocentConfig::default(), None, no_env);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.auth_scheme, "Token");
        assert_eq!(resolved.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(resolved.failure_message, DEFAULT_FAILURE_MESSAGE);
        assert_eq!(resolved.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let config = DocentConfig {
            backend: BackendConfig {
                base_url: Some("http://file".to_string()),
                auth_scheme: Some("Bearer".to_string()),
            },
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [("DOCENT_BASE_URL", "http://env")].into();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        assert_eq!(resolve_with(&config, None, no_env).base_url, "http://file");
        assert_eq!(resolve_with(&config, None, lookup).base_url, "http://env");
        assert_eq!(
            resolve_with(&config, Some("http://cli"), lookup).base_url,
            "http://cli"
        );
        assert_eq!(resolve_with(&config, None, lookup).auth_scheme, "Bearer");
    }

    #[test]
    fn test_blank_failure_message_uses_default() {
        let config = DocentConfig {
            general: GeneralConfig {
                failure_message: Some("  ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.failure_message, DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let config = DocentConfig {
            general: GeneralConfig {
                log_level: Some("chatty".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            resolve_with(&config, None, no_env).log_filter(),
            LevelFilter::Info
        );
        let debug = |k: &str| (k == "DOCENT_LOG").then(|| "debug".to_string());
        assert_eq!(
            resolve_with(&config, None, debug).log_filter(),
            LevelFilter::Debug
        );
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[auth]
redirect_uri = "http://localhost:9999/cb"
"#;
        let config: DocentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.auth.redirect_uri.as_deref(),
            Some("http://localhost:9999/cb")
        );
        assert!(config.backend.base_url.is_none());
        assert!(config.general.log_level.is_none());
    }

    #[test]
    fn test_generated_default_parses_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docent").join("config.toml");

        let (first, source) = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(source, ConfigSource::Generated(path.clone()));
        assert!(first.backend.base_url.is_none());

        let (reloaded, source) = load_config_from(&path).unwrap();
        assert_eq!(source, ConfigSource::File(path.clone()));
        assert!(reloaded.auth.redirect_uri.is_none());
    }

    #[test]
    fn test_unwritable_default_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("docent");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("config.toml");

        let (config, source) = load_config_from(&path).unwrap();

        assert!(config.backend.base_url.is_none());
        assert!(matches!(source, ConfigSource::GenerateFailed { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend\nbase_url = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
