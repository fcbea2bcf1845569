//! Runtime configuration for the messaging core.
//!
//! Every section is optional in the TOML source; missing values fall back to
//! the defaults below.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//!
//! [job_runner]
//! max_attempts = 5
//! retry_backoff_ms = 100
//! poll_interval_ms = 50
//!
//! [queue]
//! delivery_poll_interval_ms = 10
//! capacity = 100
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub logging: LoggingConfig,
    pub job_runner: JobRunnerConfig,
    pub queue: QueueConfig,
}

impl MessagingConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JobRunnerConfig {
    /// Total number of executions a job gets before it is reported as failed.
    pub max_attempts: u32,
    /// Pause before a failed job is executed again.
    pub retry_backoff_ms: u64,
    /// How long the runner waits for new work before re-checking its retry queue.
    pub poll_interval_ms: u64,
}

impl JobRunnerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 0,
            poll_interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub delivery_poll_interval_ms: u64,
    /// Unconsumed payloads a destination holds before publishing is refused.
    pub capacity: usize,
}

impl QueueConfig {
    pub fn delivery_poll_interval(&self) -> Duration {
        Duration::from_millis(self.delivery_poll_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            delivery_poll_interval_ms: 10,
            capacity: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = MessagingConfig::from_toml_str("").unwrap();
        assert_eq!(config, MessagingConfig::default());
        assert_eq!(config.job_runner.max_attempts, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = MessagingConfig::from_toml_str(
            r#"
            [job_runner]
            max_attempts = 5

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.job_runner.max_attempts, 5);
        assert_eq!(config.job_runner.poll_interval(), Duration::from_millis(50));
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.queue.delivery_poll_interval(), Duration::from_millis(10));
        assert_eq!(config.queue.capacity, 100);
    }

    #[test]
    fn queue_capacity_is_configurable() {
        let config = MessagingConfig::from_toml_str("[queue]\ncapacity = 8").unwrap();
        assert_eq!(config.queue.capacity, 8);
        assert_eq!(config.queue.delivery_poll_interval_ms, 10);
    }

    #[test]
    fn malformed_source_is_a_parse_error() {
        let err = MessagingConfig::from_toml_str("[job_runner]\nmax_attempts = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MessagingConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
