//! The logger handle.
//!
//! A [`Logger`] is immutable once built. [`Logger::with`] and
//! [`Logger::with_context`] return new handles carrying extra fields; the
//! handle they were derived from keeps logging exactly as before. Handles are
//! cheap to clone and safe to share across threads.

use std::sync::Arc;

use crate::builder::LoggerBuilder;
use crate::clock::Clock;
use crate::config::LoggerConfig;
use crate::context::Context;
use crate::domain::{Environment, Field, Level, LoggerError, Result};
use crate::encoder::Caller;
use crate::engine::Engine;
use crate::pipeline::SinkPlan;
use crate::trace::TraceSpan;

/// A configured logging endpoint.
///
/// # Example
///
/// ```
/// use rhino_logger::{Context, Field, LoggerBuilder};
/// use rhino_logger::sink::MemorySink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = LoggerBuilder::new().console_sink(sink.clone()).build()?;
///
/// let ctx = Context::new().with_request_id("r1");
/// logger.info_ctx(&ctx, "order placed", &[Field::uint("items", 3)]);
///
/// let record = &sink.records()[0];
/// assert_eq!(record["request_id"], "r1");
/// assert_eq!(record["items"], 3);
/// # Ok::<(), rhino_logger::LoggerError>(())
/// ```
#[derive(Clone)]
pub struct Logger {
    env: Environment,
    config: Arc<LoggerConfig>,
    plan: Arc<SinkPlan>,
    engine: Engine,
    clock: Arc<dyn Clock>,
}

impl Logger {
    pub(crate) fn from_parts(
        env: Environment,
        config: LoggerConfig,
        plan: SinkPlan,
        engine: Engine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            env,
            config: Arc::new(config),
            plan: Arc::new(plan),
            engine,
            clock,
        }
    }

    /// Same as [`LoggerBuilder::new`].
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Builds a logger from a complete configuration.
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn new(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    /// Builds the development preset: console, debug and above.
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn development() -> Result<Self> {
        LoggerBuilder::development().build()
    }

    /// Builds the production preset: rotating `logs/run.log`, info and above.
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn production() -> Result<Self> {
        LoggerBuilder::production().build()
    }

    #[must_use]
    pub const fn env(&self) -> Environment {
        self.env
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }

    #[must_use]
    pub fn version_name(&self) -> &str {
        &self.config.version_name
    }

    #[must_use]
    pub fn request_key(&self) -> &str {
        &self.config.request_key
    }

    #[must_use]
    pub fn user_key(&self) -> &str {
        &self.config.user_key
    }

    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// The sinks this logger writes to.
    #[must_use]
    pub fn sink_plan(&self) -> &SinkPlan {
        &self.plan
    }

    /// Fields attached to every record of this handle, identity fields included.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        self.engine.fields()
    }

    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        self.engine.enabled(level)
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns a new handle with `fields` attached to every record.
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Self {
        Self {
            engine: self.engine.with(fields),
            ..self.clone()
        }
    }

    /// Returns a new handle carrying the request and user ids found in `ctx`.
    ///
    /// Each id is attached under the configured key name when the context holds
    /// a string under that name. Missing ids and ids of any other type are
    /// skipped without error.
    #[must_use]
    pub fn with_context(&self, ctx: &Context) -> Self {
        let fields: Vec<Field> = [self.request_key(), self.user_key()]
            .into_iter()
            .filter_map(|key| {
                ctx.string_value(key)
                    .map(|value| Field::string(key.to_string(), value))
            })
            .collect();
        self.with(&fields)
    }

    pub(crate) fn log_at(&self, level: Level, message: &str, fields: &[Field], caller: Option<Caller>) {
        self.engine.log(level, message, fields, caller);
    }

    #[track_caller]
    pub fn debug(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Debug, message, fields, Some(Caller::here()));
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Info, message, fields, Some(Caller::here()));
    }

    #[track_caller]
    pub fn warn(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Warn, message, fields, Some(Caller::here()));
    }

    /// Logs at error level, adding an `error` field when `err` is present.
    #[track_caller]
    pub fn error(&self, message: &str, err: Option<&dyn std::error::Error>, fields: &[Field]) {
        let caller = Some(Caller::here());
        match err {
            Some(err) => {
                let mut all = Vec::with_capacity(fields.len() + 1);
                all.extend_from_slice(fields);
                all.push(Field::error(err));
                self.log_at(Level::Error, message, &all, caller);
            }
            None => self.log_at(Level::Error, message, fields, caller),
        }
    }

    /// Logs at fatal level, flushes, and terminates the process.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) -> ! {
        self.engine.fatal(message, fields, Some(Caller::here()))
    }

    #[track_caller]
    pub fn debug_ctx(&self, ctx: &Context, message: &str, fields: &[Field]) {
        self.with_context(ctx).debug(message, fields);
    }

    #[track_caller]
    pub fn info_ctx(&self, ctx: &Context, message: &str, fields: &[Field]) {
        self.with_context(ctx).info(message, fields);
    }

    #[track_caller]
    pub fn warn_ctx(&self, ctx: &Context, message: &str, fields: &[Field]) {
        self.with_context(ctx).warn(message, fields);
    }

    #[track_caller]
    pub fn error_ctx(
        &self,
        ctx: &Context,
        message: &str,
        err: Option<&dyn std::error::Error>,
        fields: &[Field],
    ) {
        self.with_context(ctx).error(message, err, fields);
    }

    #[track_caller]
    pub fn fatal_ctx(&self, ctx: &Context, message: &str, fields: &[Field]) -> ! {
        self.with_context(ctx).fatal(message, fields)
    }

    /// Starts timing a unit of work named `function`.
    ///
    /// Emits a debug "Starting function" record now and a "Finished function"
    /// record with the elapsed `duration` when the returned span is finished or
    /// dropped.
    ///
    /// ```
    /// # use rhino_logger::{Context, Logger};
    /// fn handle(logger: &Logger, ctx: &Context) {
    ///     let _span = logger.trace(ctx, "handle");
    ///     // work; the span finishes on every return path
    /// }
    /// ```
    #[track_caller]
    pub fn trace(&self, ctx: &Context, function: &str) -> TraceSpan {
        TraceSpan::start(self.with_context(ctx), function, Caller::here())
    }

    /// Flushes buffered output. Call before exiting when file sinks are in use.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Io`] if the sink fails to flush.
    pub fn sync(&self) -> Result<()> {
        self.engine.sync().map_err(LoggerError::from)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("env", &self.env)
            .field("service", &self.config.service_name)
            .field("sinks", &self.plan.to_string())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
