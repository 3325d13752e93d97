//! Configuration management for dirwatch.
//!
//! Uses figment to merge configuration from multiple sources:
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables (`DIRWATCH_MONITOR__FLUSH_INTERVAL_SECS=5`)
//! 4. Command-line arguments

use crate::buffer::DEFAULT_EVENTS_PER_WATCH;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Monitor configuration
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Monitor-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between output flushes while idle
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,

    /// Cap on receive buffer growth, in maximal records per watch
    #[serde(default = "default_events_per_watch")]
    pub events_per_watch: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_flush_interval_secs() -> u64 {
    10
}

fn default_events_per_watch() -> usize {
    DEFAULT_EVENTS_PER_WATCH
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            flush_interval_secs: default_flush_interval_secs(),
            events_per_watch: default_events_per_watch(),
        }
    }
}

impl MonitorConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }

    pub fn events_per_watch(&self) -> usize {
        self.events_per_watch.max(1)
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_file: Option<&PathBuf>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        } else {
            let default_paths = [
                PathBuf::from("/etc/dirwatch/config.toml"),
                dirs::config_dir()
                    .unwrap_or_default()
                    .join("dirwatch/config.toml"),
            ];

            for path in &default_paths {
                if path.exists() {
                    figment = figment.merge(Toml::file(path));
                    break;
                }
            }
        }

        // Double underscore separates sections so keys may contain `_`.
        figment = figment.merge(Env::prefixed("DIRWATCH_").split("__"));

        figment.extract()
    }

    /// Override log level from CLI
    pub fn with_log_level(mut self, log_level: Option<String>) -> Self {
        if let Some(level) = log_level {
            self.monitor.log_level = level;
        }
        self
    }

    /// Override flush interval from CLI
    pub fn with_flush_interval(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.monitor.flush_interval_secs = secs;
        }
        self
    }

    /// Override per-watch buffer budget from CLI
    pub fn with_events_per_watch(mut self, events: Option<usize>) -> Self {
        if let Some(events) = events {
            self.monitor.events_per_watch = events;
        }
        self
    }
}
