//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, merging files
//! found in the standard locations, and reading `CTS_*` environment variables.
//! Applying the result on top of [`ExtractConfig`] defaults is the caller's
//! job, since the caller also owns the command-line layer.

use crate::error::ExtractError;
use crate::types::{ExtractConfig, TableLayout};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const LOCAL_CONFIG_NAMES: [&str; 2] = ["ct-subdomains.toml", ".ct-subdomains.toml"];
const GLOBAL_CONFIG_NAMES: [&str; 2] = [".ct-subdomains.toml", "ct-subdomains.toml"];

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// proxy = "http://127.0.0.1:8080"
/// timeout = "30s"
///
/// [layout]
/// results_table_index = 2
/// identity_column_index = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default transport settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Overrides for the results page layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,
}

/// Default values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Proxy for http and https
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Request timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Search endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,

    /// User-Agent header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Positional layout overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LayoutConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_table_index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_column_index: Option<usize>,
}

impl FileConfig {
    /// Apply the values present in this file on top of `config`.
    ///
    /// Only called on validated configs, so timeouts are known to parse.
    pub fn apply_to(&self, mut config: ExtractConfig) -> ExtractConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(proxy) = &defaults.proxy {
                config.proxy = Some(proxy.clone());
            }
            if let Some(secs) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
                config.timeout = Duration::from_secs(secs);
            }
            if let Some(search_url) = &defaults.search_url {
                config.search_url = search_url.clone();
            }
            if let Some(user_agent) = &defaults.user_agent {
                config.user_agent = user_agent.clone();
            }
        }

        if let Some(layout) = &self.layout {
            config.layout = TableLayout {
                results_table_index: layout
                    .results_table_index
                    .unwrap_or(config.layout.results_table_index),
                identity_column_index: layout
                    .identity_column_index
                    .unwrap_or(config.layout.identity_column_index),
            };
        }

        config
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Directory searched for local config files
    local_dir: PathBuf,
    /// User home directory
    home_dir: Option<PathBuf>,
    /// XDG config base directory
    xdg_config_dir: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a configuration manager rooted at the current directory,
    /// `$HOME` and `$XDG_CONFIG_HOME` (falling back to `~/.config`).
    pub fn new() -> Self {
        let home_dir = env::var_os("HOME").map(PathBuf::from);
        let xdg_config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir.as_ref().map(|home| home.join(".config")));

        Self {
            local_dir: PathBuf::from("."),
            home_dir,
            xdg_config_dir,
        }
    }

    /// Create a configuration manager with explicit search directories.
    pub fn with_dirs(
        local_dir: impl Into<PathBuf>,
        home_dir: Option<PathBuf>,
        xdg_config_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            local_dir: local_dir.into(),
            home_dir,
            xdg_config_dir,
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// `FileError` when the file is missing or unreadable, `ConfigError` when
    /// it is not valid TOML or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, ExtractError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            ExtractError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory, then the local
    /// directory. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged_config = merge_configs(merged_config, config),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        merged_config
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        LOCAL_CONFIG_NAMES
            .iter()
            .map(|name| self.local_dir.join(name))
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = self.home_dir.as_ref()?;
        GLOBAL_CONFIG_NAMES
            .iter()
            .map(|name| home.join(name))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let path = self
            .xdg_config_dir
            .as_ref()?
            .join("ct-subdomains")
            .join("config.toml");
        path.exists().then_some(path)
    }

    /// Validate configuration values.
    fn validate_config(&self, config: &FileConfig) -> Result<(), ExtractError> {
        if let Some(defaults) = &config.defaults {
            if let Some(timeout) = &defaults.timeout {
                match parse_timeout_string(timeout) {
                    Some(0) => {
                        return Err(ExtractError::config("Timeout must be greater than zero"))
                    }
                    Some(_) => {}
                    None => {
                        return Err(ExtractError::config(format!(
                            "Invalid timeout '{}', use format like '5s', '30s', '2m'",
                            timeout
                        )))
                    }
                }
            }

            if matches!(&defaults.proxy, Some(proxy) if proxy.trim().is_empty()) {
                return Err(ExtractError::config("Proxy cannot be empty"));
            }

            if matches!(&defaults.search_url, Some(url) if url.trim().is_empty()) {
                return Err(ExtractError::config("Search URL cannot be empty"));
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge two configurations with proper precedence.
///
/// Values from `higher` take precedence over values from `lower`.
pub fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    FileConfig {
        defaults: match (lower.defaults, higher.defaults) {
            (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                proxy: higher_defaults.proxy.or(lower_defaults.proxy),
                timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                search_url: higher_defaults.search_url.or(lower_defaults.search_url),
                user_agent: higher_defaults.user_agent.or(lower_defaults.user_agent),
            }),
            (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
        },
        layout: match (lower.layout, higher.layout) {
            (Some(lower_layout), Some(higher_layout)) => Some(LayoutConfig {
                results_table_index: higher_layout
                    .results_table_index
                    .or(lower_layout.results_table_index),
                identity_column_index: higher_layout
                    .identity_column_index
                    .or(lower_layout.identity_column_index),
            }),
            (lower_layout, higher_layout) => higher_layout.or(lower_layout),
        },
    }
}

/// Settings read from `CTS_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub proxy: Option<String>,
    pub timeout: Option<String>,
    pub search_url: Option<String>,
    pub user_agent: Option<String>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply the values present in the environment on top of `config`.
    pub fn apply_to(&self, mut config: ExtractConfig) -> ExtractConfig {
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(secs) = self.timeout.as_deref().and_then(parse_timeout_string) {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(search_url) = &self.search_url {
            config.search_url = search_url.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}

/// Load configuration from `CTS_*` environment variables.
///
/// Supported variables:
/// - `CTS_PROXY`: proxy for http and https
/// - `CTS_TIMEOUT`: request timeout ("30s", "2m")
/// - `CTS_SEARCH_URL`: search endpoint
/// - `CTS_USER_AGENT`: User-Agent header
/// - `CTS_CONFIG`: path to a config file
///
/// Empty and invalid values are ignored with a warning.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Same as [`load_env_config`] with a custom variable lookup.
pub fn load_env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .inspect(|value| debug!("using {}={}", key, value))
    };

    let timeout = non_empty("CTS_TIMEOUT").filter(|value| {
        let valid = matches!(parse_timeout_string(value), Some(secs) if secs > 0);
        if !valid {
            warn!(
                "invalid CTS_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                value
            );
        }
        valid
    });

    EnvConfig {
        proxy: non_empty("CTS_PROXY"),
        timeout,
        search_url: non_empty("CTS_SEARCH_URL"),
        user_agent: non_empty("CTS_USER_AGENT"),
        config: non_empty("CTS_CONFIG"),
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }
}
