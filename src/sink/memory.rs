use std::io;
use std::sync::Mutex;

use serde_json::Value as JsonValue;

use super::{poisoned, WriteSink};

/// Captures records in memory.
///
/// Useful as a console replacement in tests:
///
/// ```
/// use rhino_logger::{Field, LoggerBuilder};
/// use rhino_logger::sink::MemorySink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = LoggerBuilder::new().console_sink(sink.clone()).build()?;
/// logger.info("hello", &[Field::string("k", "v")]);
///
/// let records = sink.records();
/// assert_eq!(records[0]["message"], "hello");
/// assert_eq!(records[0]["k"], "v");
/// # Ok::<(), rhino_logger::LoggerError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lines written so far, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Lines parsed as JSON. Lines that are not valid JSON are skipped.
    #[must_use]
    pub fn records(&self) -> Vec<JsonValue> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl WriteSink for MemorySink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(record);
        let mut lines = self.lines.lock().map_err(|_| poisoned("memory"))?;
        lines.push(text.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }
}
