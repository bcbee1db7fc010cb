//! Error types for the logger.
//!
//! This module defines the centralized error type [`LoggerError`] and a type alias
//! [`Result`] used throughout the crate. Errors only ever surface from construction
//! and from the global registry; individual logging calls never fail.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for logger construction and registry access.
///
/// # Examples
///
/// ```
/// use rhino_logger::{LoggerBuilder, LoggerError};
///
/// let err = LoggerBuilder::new().env("staging").build().unwrap_err();
/// assert!(matches!(err, LoggerError::Config(_)));
/// ```
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Configuration is invalid.
    ///
    /// Raised for an unrecognized environment and for violated cross-field
    /// invariants such as an empty `rotate_path` with file output enabled.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The log file (or its parent directory) could not be created or opened.
    #[error("Failed to prepare log file {}: {source}", path.display())]
    LogFile {
        /// Target log file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A global delegate was called before the registry was initialized.
    #[error("Global logger is not initialized")]
    Uninitialized,

    /// The global registry was initialized twice.
    #[error("Global logger is already initialized")]
    AlreadyInitialized,

    /// Another global `tracing` subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// A specialized `Result` type for logger operations.
pub type Result<T> = std::result::Result<T, LoggerError>;
