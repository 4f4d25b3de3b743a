//! Configuration loading from TOML files

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use harvest_aicte::config::{DEFAULT_DETAIL_URL, DEFAULT_INDEX_URL, DEFAULT_YEAR};
use harvest_aicte::Endpoints;
use harvest_core::HttpConfig;
use serde::Deserialize;

/// A setting that is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Global configuration for harvest
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub workers: WorkersConfig,
    pub source: SourceConfig,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./output"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// 1 = states are processed one after another
    pub default: usize,
    pub max: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self { default: 1, max: 16 }
    }
}

impl WorkersConfig {
    /// Worker count for a run: the CLI value if given, else the default,
    /// clamped to `max`.
    pub fn resolve(&self, requested: Option<usize>) -> Result<usize, ConfigError> {
        let n = requested.unwrap_or(self.default);
        if n == 0 {
            return Err(ConfigError("worker count must be at least 1".to_string()));
        }
        let max = self.max.max(1);
        if n > max {
            log::warn!("{n} workers requested, clamping to {max}");
            return Ok(max);
        }
        Ok(n)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub index_url: String,
    pub detail_url: String,
    /// Academic year, e.g. `2016-2017`
    pub year: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            detail_url: DEFAULT_DETAIL_URL.to_string(),
            year: DEFAULT_YEAR.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            index_url: self.index_url.clone(),
            detail_url: self.detail_url.clone(),
            year: self.year.clone(),
        }
    }
}

/// `[http]` section, all durations in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub request_timeout: u64,
    pub connect_timeout: u64,
    pub retry_delay: u64,
    /// Absent = retry forever
    pub max_retries: Option<u32>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: 60,
            connect_timeout: 30,
            retry_delay: 20,
            max_retries: None,
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(self) -> HttpConfig {
        HttpConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            retry_delay: Duration::from_secs(self.retry_delay),
            max_retries: self.max_retries,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./harvest.toml (current directory)
    /// 2. ~/.config/harvest/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("harvest.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "harvest") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
