//! Global `tracing` subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::layer::LoggerLayer;
use crate::domain::Result;
use crate::logger::Logger;

/// Installs a global `tracing` subscriber that writes events through `logger`.
///
/// The filter comes from `RUST_LOG` when it is set and valid, and otherwise
/// from the logger's environment: `debug` in development, `info` in
/// production. Events from this crate are never forwarded.
///
/// # Errors
///
/// Returns [`LoggerError::Subscriber`](crate::LoggerError::Subscriber) if a
/// global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use rhino_logger::observability::init_tracing;
/// use rhino_logger::Logger;
///
/// let logger = Logger::development()?;
/// init_tracing(&logger)?;
///
/// tracing::info!(port = 8080, "listening");
/// # Ok::<(), rhino_logger::LoggerError>(())
/// ```
pub fn init_tracing(logger: &Logger) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logger.env().min_level().as_str()));

    tracing_subscriber::registry()
        .with(filter)
        .with(LoggerLayer::new(logger.clone()))
        .try_init()?;

    Ok(())
}
