//! Configuration loading and data source resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`OCRBENCH_DATA_URL`, `OCRBENCH_TIMEOUT_MS`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the loader logs a warning and
//! continues with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Base URL the dashboard data is served from
pub const DEFAULT_DATA_URL: &str = "http://localhost:8000/data/json/";
/// Per-request fetch budget
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_MODEL_LINKS_FILE: &str = "model_links.json";
/// Category receiving result files that match no declared subcategory
pub const DEFAULT_CATEGORY: &str = "EarlyModernLatin";

pub const ENV_DATA_URL: &str = "OCRBENCH_DATA_URL";
pub const ENV_TIMEOUT_MS: &str = "OCRBENCH_TIMEOUT_MS";

/// Configuration file contents (every key optional)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Base URL of the JSON data directory
    #[serde(default)]
    pub data_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Manifest file name, relative to `data_url`
    #[serde(default)]
    pub manifest_file: Option<String>,

    /// Model links file name, relative to `data_url`
    #[serde(default)]
    pub model_links_file: Option<String>,

    /// Fallback category for unclassified result files
    #[serde(default)]
    pub default_category: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Fully resolved settings for one dashboard session
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Base URL, always ending in `/`
    pub data_url: String,
    pub timeout: Duration,
    pub manifest_file: String,
    pub model_links_file: String,
    pub default_category: String,
    pub log_level: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            model_links_file: DEFAULT_MODEL_LINKS_FILE.to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            log_level: default_log_level(),
        }
    }
}

impl DashboardSettings {
    /// Load the TOML file (explicit path or platform default) and resolve
    pub fn load(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) => load_toml_config(&path)?,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    None
                }
            },
        };

        Self::resolve(overrides, toml_config.as_ref())
    }

    /// Apply CLI → ENV → TOML → default priority
    pub fn resolve(overrides: &ConfigOverrides, toml_config: Option<&TomlConfig>) -> Result<Self> {
        let defaults = Self::default();

        // Priority 1 and 2: CLI argument, then environment
        let data_url = match overrides.data_url.clone() {
            Some(url) => url,
            None => match std::env::var(ENV_DATA_URL) {
                Ok(url) => url,
                // Priority 3 and 4: TOML, then compiled default
                Err(_) => toml_config
                    .and_then(|c| c.data_url.clone())
                    .unwrap_or(defaults.data_url),
            },
        };

        let timeout_ms = match overrides.timeout_ms {
            Some(ms) => ms,
            None => match std::env::var(ENV_TIMEOUT_MS) {
                Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                    Error::Config(format!("{} is not a number ({:?}): {}", ENV_TIMEOUT_MS, raw, e))
                })?,
                Err(_) => toml_config
                    .and_then(|c| c.timeout_ms)
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            },
        };

        if timeout_ms == 0 {
            return Err(Error::InvalidInput("timeout must be greater than zero".to_string()));
        }

        let settings = Self {
            data_url: normalize_base_url(&data_url)?,
            timeout: Duration::from_millis(timeout_ms),
            manifest_file: toml_config
                .and_then(|c| c.manifest_file.clone())
                .unwrap_or(defaults.manifest_file),
            model_links_file: toml_config
                .and_then(|c| c.model_links_file.clone())
                .unwrap_or(defaults.model_links_file),
            default_category: toml_config
                .and_then(|c| c.default_category.clone())
                .unwrap_or(defaults.default_category),
            log_level: toml_config
                .map(|c| c.logging.level.clone())
                .unwrap_or(defaults.log_level),
        };

        info!(
            data_url = %settings.data_url,
            timeout_ms = timeout_ms,
            "Resolved dashboard settings"
        );

        Ok(settings)
    }
}

/// Platform config file location: `<config_dir>/ocrbench/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ocrbench").join("config.toml"))
}

/// Read a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed for {}: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed for {}: {}", path.display(), e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(Some(config))
}

/// Trim and make sure the base URL ends with `/` so relative paths join below it
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("data URL is empty".to_string()));
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}
