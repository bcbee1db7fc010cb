use std::io::{self, Write};
use std::sync::Mutex;

use super::{poisoned, WriteSink};

enum Stream {
    Stdout,
    Stderr,
}

/// Writes records to a standard stream.
pub struct ConsoleSink {
    stream: Stream,
    // Serializes whole records so that concurrent writers never interleave.
    lock: Mutex<()>,
}

impl ConsoleSink {
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
            lock: Mutex::new(()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl WriteSink for ConsoleSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned("console"))?;
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(record),
            Stream::Stderr => io::stderr().lock().write_all(record),
        }
    }

    fn sync(&self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        };
        f.debug_tuple("ConsoleSink").field(&name).finish()
    }
}
