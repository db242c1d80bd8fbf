//! Configuration management for Sift services.
//!
//! All Sift services share a unified configuration file at `~/.sift/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (SIFT_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SIFT_SCREENER_PORT` → screener.port
//! - `SIFT_BIND_ADDRESS` → screener.host
//! - `SIFT_DATASET_PATH` → screener.dataset_path
//! - `SIFT_LOG_LEVEL` → observability.log_level

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".sift"),
        |dirs| dirs.home_dir().join(".sift"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Screener Service Configuration
// ============================================================================

/// Configuration for the screening service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Screener service HTTP port
    #[serde(default = "default_screener_port")]
    pub port: u16,

    /// Screener service HTTP host
    #[serde(default = "default_host")]
    pub host: String,

    /// Path to the stock dataset CSV file.
    ///
    /// The file is loaded once at startup into a read-only snapshot.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Maximum number of records returned per screening request.
    /// `None` means unlimited.
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            port: default_screener_port(),
            host: default_host(),
            dataset_path: default_dataset_path(),
            max_results: None,
        }
    }
}

fn default_screener_port() -> u16 {
    5000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_dataset_path() -> String {
    "stock_screener_data.csv".to_string()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration shared by all services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets to exclude from logging.
    ///
    /// These modules will be set to `warn` level to reduce noise.
    /// Built-in noisy modules (hyper, h2, tower_http) are always filtered;
    /// this list allows adding custom modules.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Top-level Configuration
// ============================================================================

/// Unified configuration for Sift services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Screening service configuration
    #[serde(default)]
    pub screener: ScreenerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// Returns defaults when the config file does not exist.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable fallbacks.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("SIFT_SCREENER_PORT") {
            if let Ok(p) = port.parse() {
                self.screener.port = p;
            }
        }

        if let Ok(bind) = std::env::var("SIFT_BIND_ADDRESS") {
            self.screener.host = bind;
        }

        if let Ok(path) = std::env::var("SIFT_DATASET_PATH") {
            self.screener.dataset_path = path;
        }

        if let Ok(level) = std::env::var("SIFT_LOG_LEVEL") {
            self.observability.log_level = level;
        }
    }
}
