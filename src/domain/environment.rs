//! Deployment environment of the logging service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LoggerError;
use super::level::Level;

/// Environment a logger is built for.
///
/// The environment selects the sink layout (see [`crate::pipeline::plan`]) and
/// the engine preset: minimum level and duration rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Console-favoring, verbose.
    Development,
    /// File-favoring, info and above.
    Production,
}

impl Environment {
    /// Lowercase name, as written in configuration and in the `env` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Lowest level emitted by loggers built for this environment.
    #[must_use]
    pub const fn min_level(self) -> Level {
        match self {
            Self::Development => Level::Debug,
            Self::Production => Level::Info,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(LoggerError::Config(format!(
                "invalid environment \"{other}\", use development or production"
            ))),
        }
    }
}
