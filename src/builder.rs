//! Builder for [`Logger`] handles.

use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::LoggerConfig;
use crate::domain::{Environment, Field, Result};
use crate::encoder::{EncoderConfig, JsonEncoder};
use crate::engine::{Engine, ExitFn};
use crate::logger::Logger;
use crate::pipeline;
use crate::sink::{ConsoleSink, WriteSink};

/// Collects options, validates them and builds a [`Logger`].
///
/// The configuration is only checked in [`build`](Self::build), so setters can be
/// applied in any order.
///
/// # Example
///
/// ```no_run
/// use rhino_logger::LoggerBuilder;
///
/// let logger = LoggerBuilder::new()
///     .env("production")
///     .service_name("billing")
///     .log_to_file(true)
///     .rotate(true)
///     .rotate_path("/var/log/billing/run.log")
///     .rotate_size(50)
///     .build()?;
/// logger.info("started", &[]);
/// # Ok::<(), rhino_logger::LoggerError>(())
/// ```
#[must_use = "a builder does nothing until `build` is called"]
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<Arc<dyn WriteSink>>,
    clock: Option<Arc<dyn Clock>>,
    on_fatal: ExitFn,
}

impl LoggerBuilder {
    /// Starts from [`LoggerConfig::default`], the development preset.
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    /// Starts from [`LoggerConfig::development`].
    pub fn development() -> Self {
        Self::from_config(LoggerConfig::development())
    }

    /// Starts from [`LoggerConfig::production`].
    pub fn production() -> Self {
        Self::from_config(LoggerConfig::production())
    }

    /// Starts from a complete configuration, e.g. one loaded with
    /// [`LoggerConfig::from_file`].
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            clock: None,
            on_fatal: std::process::exit,
        }
    }

    /// Sets the environment by name. Only `development` and `production` build.
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.config.env = env.into();
        self
    }

    /// Sets the environment from a parsed [`Environment`].
    pub fn environment(self, env: Environment) -> Self {
        self.env(env.as_str())
    }

    /// Sets the `service` field. An empty name omits the field.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Sets the `version` field. An empty version omits the field.
    pub fn version_name(mut self, version: impl Into<String>) -> Self {
        self.config.version_name = version.into();
        self
    }

    /// Context key and field name for the request id.
    pub fn request_key(mut self, key: impl Into<String>) -> Self {
        self.config.request_key = key.into();
        self
    }

    /// Context key and field name for the user id.
    pub fn user_key(mut self, key: impl Into<String>) -> Self {
        self.config.user_key = key.into();
        self
    }

    /// Enables file output at [`rotate_path`](Self::rotate_path).
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.config.log_to_file = enabled;
        self
    }

    /// Rotates the log file. Only used together with `log_to_file`.
    pub fn rotate(mut self, enabled: bool) -> Self {
        self.config.rotate = enabled;
        self
    }

    /// Log file location. Missing parent directories are created at build.
    pub fn rotate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rotate_path = path.into();
        self
    }

    /// Rollover size in MiB. Must be at least 1 when rotating.
    pub fn rotate_size(mut self, megabytes: u64) -> Self {
        self.config.rotate_size = megabytes;
        self
    }

    /// Days to keep rotated files; `0` keeps them forever.
    pub fn rotate_age(mut self, days: u32) -> Self {
        self.config.rotate_age = days;
        self
    }

    /// Rotated files to keep; `0` keeps all of them.
    pub fn rotate_backups(mut self, count: usize) -> Self {
        self.config.rotate_backups = count;
        self
    }

    /// Gzips rotated files.
    pub fn rotate_compress(mut self, enabled: bool) -> Self {
        self.config.rotate_compress = enabled;
        self
    }

    /// Replaces standard output wherever the pipeline writes to the console.
    pub fn console_sink(mut self, sink: Arc<dyn WriteSink>) -> Self {
        self.console = Some(sink);
        self
    }

    /// Time source for [`Logger::trace`] spans.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces process exit after a fatal record. The hook must not return;
    /// tests typically install one that panics.
    pub fn on_fatal(mut self, exit: ExitFn) -> Self {
        self.on_fatal = exit;
        self
    }

    /// Options collected so far, not yet validated.
    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Validates the options and assembles the output pipeline.
    ///
    /// # Errors
    ///
    /// - [`LoggerError::Config`](crate::LoggerError::Config) for an unknown
    ///   environment or inconsistent options
    /// - [`LoggerError::LogFile`](crate::LoggerError::LogFile) if the log file
    ///   cannot be created or opened
    pub fn build(self) -> Result<Logger> {
        let env = self.config.validate()?;
        let plan = pipeline::plan(env, &self.config);

        if env == Environment::Development && self.config.log_to_file && !self.config.rotate {
            tracing::warn!(
                path = %self.config.rotate_path.display(),
                "file output without rotation is not written in development; logging to console only"
            );
        }

        let console: Arc<dyn WriteSink> = match self.console {
            Some(sink) => sink,
            None => Arc::new(ConsoleSink::stdout()),
        };
        let sink = pipeline::assemble(&plan, &console)?;
        tracing::debug!(env = %env, sinks = %plan, "built logger pipeline");

        let mut identity = vec![Field::string("env", env.as_str())];
        if !self.config.service_name.is_empty() {
            identity.push(Field::string("service", self.config.service_name.clone()));
        }
        if !self.config.version_name.is_empty() {
            identity.push(Field::string("version", self.config.version_name.clone()));
        }

        let engine = Engine::new(
            JsonEncoder::new(EncoderConfig::for_env(env)),
            sink,
            env.min_level(),
            self.on_fatal,
        )
        .with(&identity);

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(Logger::from_parts(env, self.config, plan, engine, clock))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("console_override", &self.console.is_some())
            .finish_non_exhaustive()
    }
}
