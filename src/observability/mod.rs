//! Bridge from the `tracing` ecosystem into a [`Logger`](crate::Logger).
//!
//! Libraries instrumented with `tracing` macros can be routed into the same
//! JSON records as direct logger calls:
//!
//! ```text
//! tracing::info!(..) → EnvFilter → LoggerLayer → Logger → sinks
//! ```
//!
//! - [`init_tracing`]: installs the bridge as the global subscriber
//! - [`LoggerLayer`]: the layer itself, for composing custom subscribers

mod init;
mod layer;

pub use init::init_tracing;
pub use layer::LoggerLayer;
