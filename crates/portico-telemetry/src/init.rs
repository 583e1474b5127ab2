//! Telemetry initialisation primitives and logging configuration.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Records the build SHA once to avoid inconsistencies across modules.
//! - Optionally tees formatted output into a `LogStore`.

use std::io;

use once_cell::sync::OnceCell;
use tracing::{Subscriber, debug};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};
use crate::log_store::LogStore;

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    record_build_sha(config);
    build_subscriber(config, io::stderr, true)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Install the tracing subscriber and mirror every formatted line into `store`.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed.
pub fn init_logging_with_store(config: &LoggingConfig, store: &LogStore) -> Result<()> {
    record_build_sha(config);
    store_subscriber(config, store)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

fn record_build_sha(config: &LoggingConfig) {
    if BUILD_SHA.set(config.build_sha.to_string()).is_err() {
        debug!(build_sha = config.build_sha, "build sha already recorded");
    }
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

fn store_subscriber(config: &LoggingConfig, store: &LogStore) -> BoxedSubscriber {
    build_subscriber(config, store.make_writer(), false)
}

fn build_subscriber<W>(config: &LoggingConfig, writer: W, ansi: bool) -> BoxedSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(build_env_filter(config.level));
    match config.format {
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Pretty => Box::new(
            registry.with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            ),
        ),
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_installs_subscriber_once() {
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            build_sha: "dev",
        };
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn build_sha_is_recorded_once() {
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Json,
            build_sha: "dev",
        };
        record_build_sha(&config);
        let recorded = build_sha();
        assert!(!recorded.is_empty());

        record_build_sha(&LoggingConfig {
            build_sha: "later-sha",
            ..config
        });
        assert_eq!(build_sha(), recorded);
    }

    #[test]
    fn store_subscriber_captures_formatted_events() {
        let store = LogStore::in_memory(16);
        let config = LoggingConfig {
            level: "info",
            format: LogFormat::Json,
            build_sha: "dev",
        };
        tracing::subscriber::with_default(store_subscriber(&config, &store), || {
            tracing::info!(state = "web", "launch resolved");
            tracing::debug!("below the configured level");
        });

        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap_or_default();
        assert_eq!(event["fields"]["message"], "launch resolved");
        assert_eq!(event["fields"]["state"], "web");
        assert_eq!(event["level"], "INFO");
    }
}
