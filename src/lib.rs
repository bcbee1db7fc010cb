//! Rhino Logger: structured JSON logging with environment presets.
//!
//! Rhino Logger writes one JSON object per line and provides:
//! - Two presets, `development` (console, debug and up) and `production`
//!   (rotating file, info and up)
//! - Leveled emission with typed key-value fields and source locations
//! - Request and user ids lifted from a typed [`Context`]
//! - Size-based file rotation with age and count retention and gzip
//! - Start/finish timing spans
//! - An optional process-wide default logger
//! - A bridge that routes `tracing` events into the same records
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Facade (global/, logger, trace)                    │  ← Public API
//! │  - Leveled methods, context variants                │
//! │  - Derived handles, timing spans                    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Construction (config, builder, pipeline)           │  ← Validation
//! │  - Options and presets                              │  ← Sink choice
//! │  - Sink plan per environment                        │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Engine        │   │ Encoder       │   │ Sinks         │
//! │ (engine)      │   │ (encoder)     │   │ (sink/)       │
//! │ - Thresholds  │   │ - JSON lines  │   │ - Console     │
//! │ - Stack traces│   │ - Time format │   │ - Files       │
//! │ - Fatal exit  │   │ - Caller      │   │ - Rotation    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - File preparation (infrastructure/)               │
//! │  - Levels, environments, fields, errors (domain/)   │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - `tracing` events into the logger                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Levels, environments, fields and errors
//! - [`config`]: Options, presets and TOML loading
//! - [`pipeline`]: Sink selection and assembly
//! - [`sink`]: Console, file, rotating, tee and in-memory sinks
//! - [`encoder`]: JSON line encoding
//! - [`context`]: Typed request-scoped values
//! - [`global`]: Process-wide default logger
//! - [`observability`]: `tracing` bridge
//!
//! # Record Format
//!
//! ```json
//! {"level":"info","time":"2024-05-01 10:15:42.117+0200","caller":"api/orders.rs:88",
//!  "message":"order placed","env":"production","service":"billing",
//!  "version":"v2.3.1","request_id":"r-41","items":3}
//! ```
//!
//! Records at error and fatal level also carry a `stacktrace`. Durations are
//! human-readable text in development (`"1.5s"`) and float seconds in
//! production (`1.5`).
//!
//! # Examples
//!
//! ## Building a logger
//!
//! ```no_run
//! use rhino_logger::{Context, Field, LoggerBuilder};
//!
//! let logger = LoggerBuilder::production()
//!     .service_name("billing")
//!     .version_name("v2.3.1")
//!     .rotate_path("/var/log/billing/run.log")
//!     .build()?;
//!
//! let ctx = Context::new().with_request_id("r-41");
//! logger.info_ctx(&ctx, "order placed", &[Field::uint("items", 3)]);
//! logger.sync()?;
//! # Ok::<(), rhino_logger::LoggerError>(())
//! ```
//!
//! ## Loading options from TOML
//!
//! ```no_run
//! use rhino_logger::{Logger, LoggerConfig};
//!
//! let logger = Logger::new(LoggerConfig::from_file("logger.toml")?)?;
//! # Ok::<(), rhino_logger::LoggerError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Immutable handles
//!
//! A [`Logger`] never changes after it is built. Attaching fields returns a new
//! handle that shares the pipeline, so handles can be passed to other threads
//! and derived freely.
//!
//! ## Logging never fails
//!
//! Only construction and the global registry return errors. A failed write is
//! reported through `tracing` and the record is dropped.
//!
//! ## Sink choice is a pure function
//!
//! [`pipeline::plan`] maps environment and flags to a [`SinkPlan`] without
//! touching the filesystem, which keeps the selection table testable.

pub mod builder;
pub mod clock;
pub mod config;
pub mod context;
pub mod domain;
pub mod encoder;
pub mod global;
pub mod infrastructure;
pub mod logger;
pub mod observability;
pub mod pipeline;
pub mod sink;
pub mod trace;

mod engine;

pub use builder::LoggerBuilder;
pub use config::LoggerConfig;
pub use context::{Context, ContextKey};
pub use domain::{Environment, Field, FieldValue, Level, LoggerError, Result};
pub use engine::{ExitFn, FATAL_EXIT_CODE};
pub use logger::Logger;
pub use pipeline::SinkPlan;
pub use trace::TraceSpan;
