//! Sink selection and assembly.
//!
//! Building a logger happens in two steps. [`plan`] is a pure decision over the
//! environment and the output flags and returns a [`SinkPlan`]. [`assemble`]
//! then turns the plan into a live [`WriteSink`], creating files as needed.
//!
//! | environment | log_to_file | rotate | plan |
//! |---|---|---|---|
//! | development | false | any | console |
//! | development | true | true | tee(rotating file, console) |
//! | development | true | false | console |
//! | production | false | any | console |
//! | production | true | true | rotating file |
//! | production | true | false | plain file |

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::domain::{Environment, LoggerError, Result};
use crate::infrastructure::ensure_file;
use crate::sink::{FileSink, RotatingFileWriter, RotationPolicy, TeeSink, WriteSink};

/// Which sinks a logger writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkPlan {
    Console,
    PlainFile { path: PathBuf },
    RotatingFile(RotationPolicy),
    /// Every record goes to each member, in order.
    Tee(Vec<SinkPlan>),
}

impl SinkPlan {
    /// Returns `true` if any part of the plan writes to the console.
    #[must_use]
    pub fn writes_to_console(&self) -> bool {
        match self {
            Self::Console => true,
            Self::PlainFile { .. } | Self::RotatingFile(_) => false,
            Self::Tee(members) => members.iter().any(Self::writes_to_console),
        }
    }

    /// The log file written by this plan, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::Console => None,
            Self::PlainFile { path } => Some(path),
            Self::RotatingFile(policy) => Some(&policy.path),
            Self::Tee(members) => members.iter().find_map(Self::file_path),
        }
    }
}

impl fmt::Display for SinkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => f.write_str("console"),
            Self::PlainFile { path } => write!(f, "file({})", path.display()),
            Self::RotatingFile(policy) => write!(f, "rotating-file({})", policy.path.display()),
            Self::Tee(members) => {
                f.write_str("tee(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Chooses the sinks for `env` and the output flags of `config`.
///
/// Development with file output but without rotation writes to the console
/// only; no file is created in that combination.
#[must_use]
pub fn plan(env: Environment, config: &LoggerConfig) -> SinkPlan {
    if !config.log_to_file {
        return SinkPlan::Console;
    }

    match (env, config.rotate) {
        (Environment::Development, true) => SinkPlan::Tee(vec![
            SinkPlan::RotatingFile(config.rotation_policy()),
            SinkPlan::Console,
        ]),
        (Environment::Development, false) => SinkPlan::Console,
        (Environment::Production, true) => SinkPlan::RotatingFile(config.rotation_policy()),
        (Environment::Production, false) => SinkPlan::PlainFile {
            path: config.rotate_path.clone(),
        },
    }
}

/// Builds the sink described by `plan`. `console` is used wherever the plan
/// calls for console output.
///
/// # Errors
///
/// Returns [`LoggerError::LogFile`] if a log file or its parent directory
/// cannot be created or opened.
pub fn assemble(plan: &SinkPlan, console: &Arc<dyn WriteSink>) -> Result<Arc<dyn WriteSink>> {
    match plan {
        SinkPlan::Console => Ok(Arc::clone(console)),
        SinkPlan::PlainFile { path } => {
            prepare(path)?;
            let sink = FileSink::open(path).map_err(|source| LoggerError::LogFile {
                path: path.clone(),
                source,
            })?;
            Ok(Arc::new(sink))
        }
        SinkPlan::RotatingFile(policy) => {
            prepare(&policy.path)?;
            Ok(Arc::new(RotatingFileWriter::new(policy.clone())))
        }
        SinkPlan::Tee(members) => {
            let sinks = members
                .iter()
                .map(|member| assemble(member, console))
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(TeeSink::new(sinks)))
        }
    }
}

fn prepare(path: &Path) -> Result<()> {
    ensure_file(path).map_err(|source| LoggerError::LogFile {
        path: path.to_path_buf(),
        source,
    })
}
