//! Domain types shared by every layer of the logger.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`level`]: Record severities
//! - [`environment`]: Development / production presets
//! - [`field`]: Typed structured fields
//!
//! # Examples
//!
//! ```
//! use rhino_logger::domain::{Environment, Field, Level};
//!
//! let env: Environment = "production".parse()?;
//! assert_eq!(env.min_level(), Level::Info);
//! let _ = Field::string("k", "v");
//! # Ok::<(), rhino_logger::LoggerError>(())
//! ```

pub mod environment;
pub mod error;
pub mod field;
pub mod level;

pub use environment::Environment;
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use level::Level;
