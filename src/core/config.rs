//! Configuration management for firetop.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{FiretopError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for firetop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trailing window configuration
    pub window: WindowConfig,
    /// Stat entity retention
    pub stats: StatsConfig,
    /// UI configuration
    pub ui: UiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Generate synthetic events instead of reading a firehose
    pub demo: bool,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
    /// Log table rows instead of printing them
    #[serde(skip)]
    pub headless: bool,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Trailing duration for rate and average trackers
    #[serde(with = "humantime_serde")]
    pub rate_window: Duration,
}

/// Stat entity retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Applications without events for this long are pruned
    #[serde(with = "humantime_serde")]
    pub app_timeout: Duration,
    /// Container instances without metrics for this long are pruned
    #[serde(with = "humantime_serde")]
    pub container_timeout: Duration,
    /// Distinct user agent keys tracked, the overflow bucket included
    pub max_user_agents: usize,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Table refresh rate
    #[serde(with = "humantime_serde")]
    pub refresh_rate: Duration,
    /// Default view
    pub default_view: ViewMode,
    /// Table rows shown per refresh
    pub headless_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Log file path
    pub file: Option<PathBuf>,
}

/// Table views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ViewMode {
    Apps,
    Routes,
    Hosts,
    UserAgents,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: WindowConfig::default(),
            stats: StatsConfig::default(),
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            demo: false,
            debug: false,
            headless: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            rate_window: Duration::from_secs(60),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            app_timeout: Duration::from_secs(600),
            container_timeout: Duration::from_secs(120),
            max_user_agents: 1000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            refresh_rate: Duration::from_secs(1),
            default_view: ViewMode::Apps,
            headless_rows: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window.rate_window.is_zero() {
            return Err(FiretopError::config("rate_window must be greater than 0"));
        }

        if self.ui.refresh_rate.is_zero() {
            return Err(FiretopError::config("refresh_rate must be greater than 0"));
        }

        if self.stats.app_timeout.is_zero() {
            return Err(FiretopError::config("app_timeout must be greater than 0"));
        }

        if self.stats.container_timeout > self.stats.app_timeout {
            return Err(FiretopError::config(format!(
                "container_timeout ({:?}) cannot exceed app_timeout ({:?})",
                self.stats.container_timeout, self.stats.app_timeout
            )));
        }

        if self.stats.max_user_agents == 0 {
            return Err(FiretopError::config("max_user_agents must be greater than 0"));
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| FiretopError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the trailing window
    pub fn rate_window(mut self, window: Duration) -> Self {
        self.config.window.rate_window = window;
        self
    }

    /// Set the refresh rate
    pub fn refresh_rate(mut self, rate: Duration) -> Self {
        self.config.ui.refresh_rate = rate;
        self
    }

    /// Set the default view
    pub fn default_view(mut self, view: ViewMode) -> Self {
        self.config.ui.default_view = view;
        self
    }

    /// Enable synthetic events
    pub fn demo(mut self, enable: bool) -> Self {
        self.config.demo = enable;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
