//! Logger configuration.
//!
//! [`LoggerConfig`] holds every recognized option. It can be built in code,
//! taken from one of the two presets, or loaded from TOML:
//!
//! ```toml
//! env = "production"
//! service_name = "billing"
//! version_name = "v2.3.1"
//! log_to_file = true
//! rotate = true
//! rotate_path = "/var/log/billing/run.log"
//! rotate_size = 50
//! rotate_age = 14
//! rotate_backups = 20
//! rotate_compress = true
//! ```
//!
//! Omitted options keep their defaults (see [`LoggerConfig::default`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Environment, LoggerError, Result};
use crate::sink::rotating::DEFAULT_MAX_SIZE_MB;
use crate::sink::RotationPolicy;

pub const DEFAULT_SERVICE_NAME: &str = "rhino_logger";
pub const DEFAULT_VERSION: &str = "v1.0.0";
pub const DEFAULT_REQUEST_KEY: &str = "request_id";
pub const DEFAULT_USER_KEY: &str = "user_id";
pub const DEFAULT_ROTATE_PATH: &str = "logs/run.log";

/// Complete set of logger options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// `development` or `production`. Anything else fails the build.
    pub env: String,

    /// Attached to every record as `service` when non-empty.
    pub service_name: String,

    /// Attached to every record as `version` when non-empty.
    pub version_name: String,

    /// Context key read for the request id, also used as the field name.
    pub request_key: String,

    /// Context key read for the user id, also used as the field name.
    pub user_key: String,

    /// Write records to `rotate_path`. Defaults to console only.
    pub log_to_file: bool,

    /// Rotate the log file. Only meaningful with `log_to_file`.
    pub rotate: bool,

    /// Log file location. Only meaningful with `log_to_file`.
    pub rotate_path: PathBuf,

    /// Rollover size in MB.
    pub rotate_size: u64,

    /// Days to keep rotated files; `0` keeps them forever.
    pub rotate_age: u32,

    /// Rotated files to keep; `0` keeps all of them.
    pub rotate_backups: usize,

    /// Gzip rotated files.
    pub rotate_compress: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development.as_str().to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            version_name: DEFAULT_VERSION.to_string(),
            request_key: DEFAULT_REQUEST_KEY.to_string(),
            user_key: DEFAULT_USER_KEY.to_string(),
            log_to_file: false,
            rotate: false,
            rotate_path: PathBuf::from(DEFAULT_ROTATE_PATH),
            rotate_size: DEFAULT_MAX_SIZE_MB,
            rotate_age: 7,
            rotate_backups: 10,
            rotate_compress: false,
        }
    }
}

impl LoggerConfig {
    /// Console output at debug level and above.
    #[must_use]
    pub fn development() -> Self {
        Self::default()
    }

    /// Rotating file output at info level and above, keeping 30 backups for
    /// 30 days.
    #[must_use]
    pub fn production() -> Self {
        Self {
            env: Environment::Production.as_str().to_string(),
            log_to_file: true,
            rotate: true,
            rotate_path: PathBuf::from(DEFAULT_ROTATE_PATH),
            rotate_size: DEFAULT_MAX_SIZE_MB,
            rotate_age: 30,
            rotate_backups: 30,
            rotate_compress: false,
            ..Self::default()
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Parse`] for malformed TOML or mistyped options.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Io`] if the file cannot be read and
    /// [`LoggerError::Parse`] if it is not valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parses `env`.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Config`] for anything other than `development`
    /// or `production`.
    pub fn environment(&self) -> Result<Environment> {
        self.env.parse()
    }

    /// Checks cross-field invariants and returns the parsed environment.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Config`] if the environment is unknown, if file
    /// output has no path, or if rotation has a zero size.
    pub fn validate(&self) -> Result<Environment> {
        let env = self.environment()?;

        if self.log_to_file && self.rotate_path.as_os_str().is_empty() {
            return Err(LoggerError::Config(
                "rotate_path is required when log_to_file is enabled".to_string(),
            ));
        }

        if self.log_to_file && self.rotate && self.rotate_size == 0 {
            return Err(LoggerError::Config(
                "rotate_size must be at least 1 MB".to_string(),
            ));
        }

        Ok(env)
    }

    /// Rotation settings derived from the `rotate_*` options.
    #[must_use]
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy {
            path: self.rotate_path.clone(),
            max_size_mb: self.rotate_size,
            max_backups: self.rotate_backups,
            max_age_days: self.rotate_age,
            compress: self.rotate_compress,
        }
    }
}
