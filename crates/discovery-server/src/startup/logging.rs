//! Logging bootstrap
//!
//! Console output plus an optional set of daily-rolling files:
//!
//! | Log File          | Receives                                   |
//! |-------------------|--------------------------------------------|
//! | discovery.log     | every event at the configured level        |
//! | store.log         | `discovery_store` events, all levels       |
//! | naming.log        | `discovery_naming` events, all levels      |
//!
//! `RUST_LOG` overrides the configured level for the console and discovery.log.

use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A daily-rolling log file; no targets means it takes every event
struct LogFile {
    name: &'static str,
    targets: &'static [&'static str],
}

const LOG_FILES: &[LogFile] = &[
    LogFile {
        name: "discovery.log",
        targets: &[],
    },
    LogFile {
        name: "store.log",
        targets: &["discovery_store"],
    },
    LogFile {
        name: "naming.log",
        targets: &["discovery_naming"],
    },
];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub file_logging: bool,
    pub level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        Self {
            log_dir: home.join("discovery").join("logs"),
            console_output: true,
            file_logging: false,
            level: Level::INFO,
        }
    }
}

/// Flushes the file writers when dropped; hold it for the life of the process
pub struct LoggingGuard {
    _writers: Vec<WorkerGuard>,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut writers = Vec::new();

    if config.console_output {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(level_filter(config.level))
                .boxed(),
        );
    }

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;

        for file in LOG_FILES {
            let (writer, guard) = daily_writer(&config.log_dir, file.name);
            writers.push(guard);

            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true);
            layers.push(if file.targets.is_empty() {
                layer
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(level_filter(config.level))
                    .boxed()
            } else {
                layer.with_filter(component_filter(file.targets)).boxed()
            });
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            "File logging initialized: {} files",
            LOG_FILES.len()
        );
    }

    Ok(LoggingGuard { _writers: writers })
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn component_filter(targets: &[&str]) -> Targets {
    targets
        .iter()
        .fold(Targets::new(), |filter, target| {
            filter.with_target(*target, LevelFilter::TRACE)
        })
}

fn daily_writer(dir: &Path, file_name: &str) -> (NonBlocking, WorkerGuard) {
    tracing_appender::non_blocking(rolling::daily(dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert!(config.console_output);
        assert!(!config.file_logging);
        assert_eq!(config.level, Level::INFO);
        assert!(config.log_dir.ends_with("discovery/logs"));
    }

    #[test]
    fn test_single_catch_all_file() {
        let catch_all: Vec<_> = LOG_FILES.iter().filter(|f| f.targets.is_empty()).collect();
        assert_eq!(catch_all.len(), 1);
        assert_eq!(catch_all[0].name, "discovery.log");
    }

    #[test]
    fn test_component_filter_matches_crate_targets() {
        let filter = component_filter(&["discovery_store"]);
        assert!(filter.would_enable("discovery_store::local", &Level::TRACE));
        assert!(!filter.would_enable("discovery_naming", &Level::ERROR));
    }

    #[test]
    fn test_file_logging_creates_log_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().join("nested").join("logs"),
            console_output: false,
            file_logging: true,
            level: Level::DEBUG,
        };

        let guard = init_logging(&config).unwrap();
        tracing::info!(target: "discovery_store", "store event");
        drop(guard);

        let names: Vec<String> = std::fs::read_dir(&config.log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        for file in LOG_FILES {
            assert!(names.iter().any(|name| name.starts_with(file.name)));
        }
    }
}
