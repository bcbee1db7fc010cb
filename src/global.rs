//! Process-wide default logger.
//!
//! The default logger is installed once and never replaced. Every delegate in
//! this module returns [`LoggerError::Uninitialized`] until one of the `init`
//! functions has succeeded, so a missing initialization surfaces as an error
//! rather than a silently dropped record.
//!
//! ```no_run
//! use rhino_logger::{global, Field};
//!
//! global::init_production()?;
//! global::info("service started", &[Field::uint("port", 8080)])?;
//! # Ok::<(), rhino_logger::LoggerError>(())
//! ```

use std::convert::Infallible;
use std::sync::OnceLock;

use crate::config::LoggerConfig;
use crate::context::Context;
use crate::domain::{Field, LoggerError, Result};
use crate::logger::Logger;
use crate::trace::TraceSpan;

static DEFAULT: OnceLock<Logger> = OnceLock::new();

/// Builds the development preset and installs it.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if a default logger exists, or
/// any error from building the logger.
pub fn init_development() -> Result<()> {
    init(LoggerConfig::development())
}

/// Builds the production preset and installs it.
///
/// # Errors
///
/// Same as [`init_development`].
pub fn init_production() -> Result<()> {
    init(LoggerConfig::production())
}

/// Builds a logger from `config` and installs it.
///
/// # Errors
///
/// Same as [`init_development`]. Nothing is built when a default logger is
/// already installed.
pub fn init(config: LoggerConfig) -> Result<()> {
    if DEFAULT.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    install(Logger::new(config)?)
}

/// Installs an already built logger as the default.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if a default logger exists.
pub fn install(logger: Logger) -> Result<()> {
    DEFAULT
        .set(logger)
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    tracing::debug!("installed default logger");
    Ok(())
}

/// Returns the default logger.
///
/// # Errors
///
/// Returns [`LoggerError::Uninitialized`] before initialization.
pub fn get() -> Result<&'static Logger> {
    DEFAULT.get().ok_or(LoggerError::Uninitialized)
}

#[must_use]
pub fn is_initialized() -> bool {
    DEFAULT.get().is_some()
}

#[track_caller]
pub fn debug(message: &str, fields: &[Field]) -> Result<()> {
    get()?.debug(message, fields);
    Ok(())
}

#[track_caller]
pub fn info(message: &str, fields: &[Field]) -> Result<()> {
    get()?.info(message, fields);
    Ok(())
}

#[track_caller]
pub fn warn(message: &str, fields: &[Field]) -> Result<()> {
    get()?.warn(message, fields);
    Ok(())
}

#[track_caller]
pub fn error(message: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) -> Result<()> {
    get()?.error(message, err, fields);
    Ok(())
}

/// Logs a fatal record through the default logger and exits.
///
/// Only returns, with an error, when no default logger is installed.
#[track_caller]
pub fn fatal(message: &str, fields: &[Field]) -> Result<Infallible> {
    get()?.fatal(message, fields)
}

#[track_caller]
pub fn debug_ctx(ctx: &Context, message: &str, fields: &[Field]) -> Result<()> {
    get()?.debug_ctx(ctx, message, fields);
    Ok(())
}

#[track_caller]
pub fn info_ctx(ctx: &Context, message: &str, fields: &[Field]) -> Result<()> {
    get()?.info_ctx(ctx, message, fields);
    Ok(())
}

#[track_caller]
pub fn warn_ctx(ctx: &Context, message: &str, fields: &[Field]) -> Result<()> {
    get()?.warn_ctx(ctx, message, fields);
    Ok(())
}

#[track_caller]
pub fn error_ctx(
    ctx: &Context,
    message: &str,
    err: Option<&dyn std::error::Error>,
    fields: &[Field],
) -> Result<()> {
    get()?.error_ctx(ctx, message, err, fields);
    Ok(())
}

#[track_caller]
pub fn fatal_ctx(ctx: &Context, message: &str, fields: &[Field]) -> Result<Infallible> {
    get()?.fatal_ctx(ctx, message, fields)
}

/// Derives a handle from the default logger. See [`Logger::with`].
///
/// # Errors
///
/// Returns [`LoggerError::Uninitialized`] before initialization.
pub fn with(fields: &[Field]) -> Result<Logger> {
    Ok(get()?.with(fields))
}

/// See [`Logger::with_context`].
///
/// # Errors
///
/// Returns [`LoggerError::Uninitialized`] before initialization.
pub fn with_context(ctx: &Context) -> Result<Logger> {
    Ok(get()?.with_context(ctx))
}

/// See [`Logger::trace`].
///
/// # Errors
///
/// Returns [`LoggerError::Uninitialized`] before initialization.
#[track_caller]
pub fn trace(ctx: &Context, function: &str) -> Result<TraceSpan> {
    Ok(get()?.trace(ctx, function))
}

/// Flushes the default logger.
///
/// # Errors
///
/// Returns [`LoggerError::Uninitialized`] before initialization, or the
/// flush error.
pub fn sync() -> Result<()> {
    get()?.sync()
}
