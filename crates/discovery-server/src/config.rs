//! Configuration management for the discovery server
//!
//! Sources, lowest precedence first: `conf/application.yml` (optional),
//! `DISCOVERY_*` environment variables, command line flags.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use config::{Config, ConfigBuilder, Environment, builder::DefaultState};
use tracing::Level;

use discovery_common::{
    DiscoveryConfig, DiscoveryError, Result,
    config::{DEFAULT_EXPIRATION_INTERVAL, DEFAULT_MAX_AGE},
};

use crate::startup::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";

pub const STORE_MAX_AGE_MS: &str = "store.max_age_ms";
pub const STORE_EXPIRATION_ENABLED: &str = "store.expiration_enabled";
pub const STORE_EXPIRATION_INTERVAL_MS: &str = "store.expiration_interval_ms";
pub const LOG_LEVEL: &str = "log.level";
pub const LOG_DIR: &str = "log.dir";
pub const LOG_CONSOLE: &str = "log.console";
pub const LOG_FILE: &str = "log.file";

/// Command line arguments for the server
#[derive(Debug, Default, Parser)]
#[command(name = "discovery-server", about = "Replicated service announcement store")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'c', long = "config", env = "DISCOVERY_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
    /// Override the announcement max age, in milliseconds
    #[arg(long = "max-age-ms")]
    pub max_age_ms: Option<i64>,
    /// Override the log level
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_file = cli
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut builder = Config::builder()
            .add_source(config::File::from(config_file).required(false))
            .add_source(
                Environment::with_prefix("DISCOVERY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(v) = cli.max_age_ms {
            builder = set_override(builder, STORE_MAX_AGE_MS, v)?;
        }
        if let Some(v) = &cli.log_level {
            builder = set_override(builder, LOG_LEVEL, v.clone())?;
        }

        let config = builder
            .build()
            .map_err(|e| DiscoveryError::ConfigError(e.to_string()))?;

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // ========================================================================
    // Store Configuration
    // ========================================================================

    pub fn max_age(&self) -> Duration {
        self.positive_millis(STORE_MAX_AGE_MS)
            .unwrap_or(DEFAULT_MAX_AGE)
    }

    pub fn expiration_enabled(&self) -> bool {
        self.config
            .get_bool(STORE_EXPIRATION_ENABLED)
            .unwrap_or(true)
    }

    pub fn expiration_interval(&self) -> Duration {
        self.positive_millis(STORE_EXPIRATION_INTERVAL_MS)
            .unwrap_or(DEFAULT_EXPIRATION_INTERVAL)
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_age: self.max_age(),
            expiration_interval: self.expiration_interval(),
            expiration_enabled: self.expiration_enabled(),
        }
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn log_level(&self) -> Level {
        self.config
            .get_string(LOG_LEVEL)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::INFO)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let defaults = LoggingConfig::default();
        LoggingConfig {
            log_dir: self
                .config
                .get_string(LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            console_output: self.config.get_bool(LOG_CONSOLE).unwrap_or(true),
            file_logging: self.config.get_bool(LOG_FILE).unwrap_or(false),
            level: self.log_level(),
        }
    }

    fn positive_millis(&self, key: &str) -> Option<Duration> {
        self.config
            .get_int(key)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .map(Duration::from_millis)
    }
}

fn set_override<T: Into<config::Value>>(
    builder: ConfigBuilder<DefaultState>,
    key: &str,
    value: T,
) -> Result<ConfigBuilder<DefaultState>> {
    builder
        .set_override(key, value)
        .map_err(|e| DiscoveryError::ConfigError(e.to_string()))
}
