//! Configuration management for rxdesk.
//!
//! Loads configuration from ${RXDESK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default API base URL when neither env nor config sets one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "RXDESK_API_URL";

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for rxdesk configuration and data files.
    //!
    //! RXDESK_HOME resolution order:
    //! 1. RXDESK_HOME environment variable (if set)
    //! 2. ~/.config/rxdesk (default)

    use std::path::PathBuf;

    /// Returns the rxdesk home directory.
    pub fn rxdesk_home() -> PathBuf {
        if let Ok(home) = std::env::var("RXDESK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".rxdesk"),
            |h| h.join(".config").join("rxdesk"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        rxdesk_home().join("config.toml")
    }

    /// Returns the path to the persisted session.
    pub fn session_path() -> PathBuf {
        rxdesk_home().join("session.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        rxdesk_home().join("logs")
    }
}

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API (e.g. `http://localhost:8000/api`)
    pub base_url: Option<String>,
    /// HTTP request timeout in seconds (0 disables)
    pub timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Config::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_LOG_FILTER: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Returns the effective API base URL: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL does not parse.
    pub fn api_base_url(&self) -> Result<String> {
        let env_url = std::env::var(API_URL_ENV).ok();
        resolve_base_url(env_url.as_deref(), self.api.base_url.as_deref())
    }

    /// Returns the HTTP timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.api.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.api.timeout_secs)))
        }
    }
}

/// Resolves a base URL with precedence: env > config > default.
///
/// Blank values are skipped. Trailing slashes are stripped so paths can be
/// joined with a single `/`.
///
/// # Errors
/// Returns an error if a non-blank value is not a valid URL.
pub fn resolve_base_url(env_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    let chosen = [env_url, config_url]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty());

    let Some(url) = chosen else {
        return Ok(DEFAULT_BASE_URL.to_string());
    };

    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}
