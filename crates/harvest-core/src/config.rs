//! Configuration management for gridharvest.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides, plus the closed set of run profiles
//! that pace the fetch engine.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Named bundle of concurrency, delay and batching settings.
///
/// Profiles form a small closed set; selection is driven by the number of
/// usable proxies available to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    /// Highest concurrency, shortest delays. Requires a large proxy pool.
    Fast,
    /// Moderate concurrency for a handful of proxies.
    Medium,
    /// Minimal concurrency with long delays; safe without proxies.
    Slow,
}

impl ProfileName {
    /// Resolve the profile to its concrete settings.
    #[must_use]
    pub fn profile(self) -> RunProfile {
        match self {
            Self::Fast => RunProfile::FAST,
            Self::Medium => RunProfile::MEDIUM,
            Self::Slow => RunProfile::SLOW,
        }
    }
}

/// Concrete pacing settings for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProfile {
    /// Maximum number of sector fetches in flight at once
    pub max_concurrent: usize,
    /// Lower bound of the pre-request jitter delay, in milliseconds
    pub delay_min_ms: u64,
    /// Upper bound of the pre-request jitter delay, in milliseconds
    pub delay_max_ms: u64,
    /// Connection pool ceiling per outbound host
    pub pool_size: usize,
    /// Number of sectors dispatched per batch
    pub batch_size: usize,
    /// Progress checkpoint cadence, in batches
    pub checkpoint_every: usize,
}

impl RunProfile {
    /// High-throughput profile for runs backed by a large proxy pool.
    pub const FAST: Self = Self {
        max_concurrent: 90,
        delay_min_ms: 50,
        delay_max_ms: 150,
        pool_size: 150,
        batch_size: 50,
        checkpoint_every: 20,
    };

    /// Moderate profile for runs with a handful of proxies.
    pub const MEDIUM: Self = Self {
        max_concurrent: 10,
        delay_min_ms: 1_000,
        delay_max_ms: 3_000,
        pool_size: 50,
        batch_size: 20,
        checkpoint_every: 10,
    };

    /// Conservative profile for proxyless runs.
    pub const SLOW: Self = Self {
        max_concurrent: 3,
        delay_min_ms: 2_000,
        delay_max_ms: 5_000,
        pool_size: 20,
        batch_size: 10,
        checkpoint_every: 5,
    };

    /// Pick a profile from the count of usable proxies.
    ///
    /// 50 or more proxies sustain the fast profile, 5 or more the medium
    /// one; anything less falls back to the slow proxyless pacing.
    #[must_use]
    pub fn auto_select(proxy_count: usize) -> ProfileName {
        if proxy_count >= 50 {
            ProfileName::Fast
        } else if proxy_count >= 5 {
            ProfileName::Medium
        } else {
            ProfileName::Slow
        }
    }
}

/// Main application configuration.
///
/// Loaded from `~/.config/gridharvest/config.toml` (or platform
/// equivalent). Missing file means defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General run settings
    pub general: GeneralConfig,
    /// Fetch behavior settings
    pub fetch: FetchConfig,
    /// Storage and export settings
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `GRIDHARVEST_COUNTRY`: Override the target country
    /// - `GRIDHARVEST_QUERY`: Override the search query
    /// - `GRIDHARVEST_DATA_DIR`: Override the data directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("GRIDHARVEST_COUNTRY") {
            if !val.is_empty() {
                tracing::debug!("Override general.country from env: {}", val);
                config.general.country = val;
            }
        }

        if let Ok(val) = std::env::var("GRIDHARVEST_QUERY") {
            if !val.is_empty() {
                tracing::debug!("Override general.query from env: {}", val);
                config.general.query = val;
            }
        }

        if let Ok(val) = std::env::var("GRIDHARVEST_DATA_DIR") {
            if !val.is_empty() {
                tracing::debug!("Override storage.data_dir from env: {}", val);
                config.storage.data_dir = PathBuf::from(val);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/gridharvest/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "gridharvest", "gridharvest").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// General run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default country to harvest
    pub country: String,
    /// Default search query sent to map sources
    pub query: String,
    /// Default grid density (sectors per axis)
    pub grid_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            country: "spain".to_string(),
            query: "negocios".to_string(),
            grid_size: 165,
        }
    }
}

/// Fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

/// Storage and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the database and exports
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}
