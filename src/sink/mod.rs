//! Output sinks for encoded records.
//!
//! A sink accepts one encoded record (a complete line, newline included) per
//! call. Every sink is internally synchronized, so a single sink can be shared
//! by any number of logger handles across threads.
//!
//! # Sinks
//!
//! - [`ConsoleSink`]: standard output (or standard error)
//! - [`FileSink`]: plain append-only file
//! - [`RotatingFileWriter`]: size/age/count bounded file, see [`rotating`]
//! - [`TeeSink`]: fans each record out to several sinks in order
//! - [`MemorySink`]: captures records in memory for tests and inspection

mod console;
mod file;
mod memory;
pub mod rotating;
mod tee;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use rotating::{RotatingFileWriter, RotationPolicy};
pub use tee::TeeSink;

use std::io;

/// Destination for encoded records.
pub trait WriteSink: Send + Sync {
    /// Writes one encoded record.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the underlying destination.
    fn write_record(&self, record: &[u8]) -> io::Result<()>;

    /// Flushes buffered output to the destination.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the underlying destination.
    fn sync(&self) -> io::Result<()>;
}

pub(crate) fn poisoned(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{what} mutex poisoned"))
}
