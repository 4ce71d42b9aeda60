//! Error types for the derived-metrics engine.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The engine's feed pump uses [`EngineError::is_retryable`] to
//! decide whether a failed read is worth retrying with backoff or should
//! stop the worker.
//!
//! ```rust
//! use raceline::EngineError;
//!
//! let error = EngineError::feed_error("shared memory unavailable");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Main error type for engine operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("Telemetry feed error: {reason}")]
    Feed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Threshold store error in {context}: {details}")]
    Store { context: String, details: String },
}

impl EngineError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Feed { .. } => true,
            EngineError::File { .. } => false,
            EngineError::Parse { .. } => false,
            EngineError::Store { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EngineError::Feed { .. } => vec![
                "Ensure the simulator is running",
                "Check shared memory permissions",
                "Try restarting the telemetry feed",
            ],
            EngineError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Ensure sufficient disk space",
            ],
            EngineError::Parse { .. } => vec![
                "Check data format compatibility",
                "Verify source data integrity",
            ],
            EngineError::Store { .. } => vec![
                "Check the threshold store file is writable",
                "Delete the store file to rebuild it from scratch",
            ],
        }
    }

    /// Helper constructor for feed errors.
    pub fn feed_error(reason: impl Into<String>) -> Self {
        EngineError::Feed { reason: reason.into(), source: None }
    }

    /// Helper constructor for feed errors with source.
    pub fn feed_error_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        EngineError::Feed { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        EngineError::File { path, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        EngineError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for threshold store errors.
    pub fn store(context: impl Into<String>, details: impl Into<String>) -> Self {
        EngineError::Store { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
