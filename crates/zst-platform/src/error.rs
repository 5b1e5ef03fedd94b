//! Platform-specific errors

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A helper program could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A helper program exited unsuccessfully
    #[error("'{program}' exited with status {code:?}: {stderr}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Trimmed standard error
        stderr: String,
    },

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;
