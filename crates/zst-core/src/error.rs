//! Error types for zst-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.
//! Per-probe and per-strategy failures are converted into result data by the
//! orchestrator; only the variants raised before any system mutation
//! (`FatalInput`, `SnapshotTaken`, snapshot I/O) ever reach the binary.

use std::path::Path;
use thiserror::Error;

/// Main error type for zst-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Strategy list or target list is unreadable or malformed
    #[error("Invalid input '{path}': {reason}")]
    FatalInput {
        /// Path of the offending input file
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Applying a strategy's configuration failed
    #[error("Failed to apply strategy '{strategy}': {reason}")]
    Apply {
        /// Strategy name
        strategy: String,
        /// Failure reason
        reason: String,
    },

    /// The baseline reference host could not be reached
    #[error("Baseline host '{host}' is unreachable")]
    BaselineUnreachable {
        /// Reference host
        host: String,
    },

    /// A single protocol check failed
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// The scheduler stopped probing because the strategy cannot win anymore
    #[error("Strategy aborted early: remaining targets cannot beat the best score")]
    AbortedEarly,

    /// One restoration step failed
    #[error("Restore step '{step}' failed: {reason}")]
    Restore {
        /// Step that failed
        step: &'static str,
        /// Failure reason
        reason: String,
    },

    /// The managed service could not be controlled
    #[error("Service '{service}' {action} failed: {reason}")]
    Service {
        /// Service name
        service: String,
        /// Action that was attempted
        action: &'static str,
        /// Failure reason
        reason: String,
    },

    /// `backup()` was called a second time
    #[error("System snapshot was already taken for this session")]
    SnapshotTaken,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Failure of a single ping or HTTP check
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The check did not finish within its budget
    #[error("timed out")]
    Timeout,

    /// The check utility could not be started
    #[error("failed to spawn check: {0}")]
    Spawn(#[source] std::io::Error),

    /// The check utility exited unsuccessfully
    #[error("check exited with status {0:?}")]
    Exit(Option<i32>),

    /// The check finished but its output could not be interpreted
    #[error("unexpected output: {0}")]
    BadOutput(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a fatal input error for a file
    pub fn fatal_input(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::FatalInput {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create an apply error
    pub fn apply(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Apply {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    /// Create a service control error
    pub fn service(
        service: impl Into<String>,
        action: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Service {
            service: service.into(),
            action,
            reason: reason.into(),
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error may only happen before the system was touched
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FatalInput { .. }
                | Self::SnapshotTaken
                | Self::Config(_)
                | Self::ConfigNotFound { .. }
                | Self::ConfigValue { .. }
                | Self::TomlParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::fatal_input("/tmp/hosts.txt", "no targets");
        assert!(err.to_string().contains("/tmp/hosts.txt"));
        assert!(err.to_string().contains("no targets"));

        let err = Error::apply("fake-split", "service restart failed");
        assert!(err.to_string().contains("fake-split"));
        assert!(err.to_string().contains("service restart failed"));
    }

    #[test]
    fn test_probe_error_wraps() {
        let err: Error = ProbeError::Timeout.into();
        match err {
            Error::Probe(ProbeError::Timeout) => {}
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::fatal_input("x", "y").is_fatal());
        assert!(Error::SnapshotTaken.is_fatal());
        assert!(!Error::apply("s", "r").is_fatal());
        assert!(!Error::BaselineUnreachable { host: "google.com".into() }.is_fatal());
        assert!(!Error::AbortedEarly.is_fatal());
        assert!(!Error::from(ProbeError::Exit(Some(7))).is_fatal());
    }

    #[test]
    fn test_probe_error_display() {
        let err = Error::from(ProbeError::Exit(Some(28)));
        assert_eq!(err.to_string(), "Probe failed: check exited with status Some(28)");
        assert!(Error::AbortedEarly.to_string().contains("cannot beat the best score"));
    }
}
