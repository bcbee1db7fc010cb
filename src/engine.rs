//! Leveled emission core shared by every logger handle.
//!
//! An [`Engine`] pairs the immutable pipeline (encoder, sink, thresholds, exit
//! hook) with a list of pre-attached fields. Deriving with more fields builds a
//! new engine that shares the pipeline and owns a new field list; the source
//! engine is never touched.

use std::backtrace::Backtrace;
use std::io;
use std::sync::Arc;

use chrono::Local;

use crate::domain::{Field, Level};
use crate::encoder::{Caller, Entry, JsonEncoder};
use crate::sink::WriteSink;

/// Called after a fatal record is written. Must not return.
pub type ExitFn = fn(i32) -> !;

/// Exit status used for fatal records.
pub const FATAL_EXIT_CODE: i32 = 1;

struct Pipeline {
    encoder: JsonEncoder,
    sink: Arc<dyn WriteSink>,
    min_level: Level,
    stacktrace_level: Level,
    exit: ExitFn,
}

#[derive(Clone)]
pub(crate) struct Engine {
    pipeline: Arc<Pipeline>,
    fields: Arc<[Field]>,
}

impl Engine {
    pub(crate) fn new(
        encoder: JsonEncoder,
        sink: Arc<dyn WriteSink>,
        min_level: Level,
        exit: ExitFn,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                encoder,
                sink,
                min_level,
                stacktrace_level: Level::Error,
                exit,
            }),
            fields: Arc::from(Vec::new()),
        }
    }

    pub(crate) fn with(&self, fields: &[Field]) -> Self {
        if fields.is_empty() {
            return self.clone();
        }
        Self {
            pipeline: Arc::clone(&self.pipeline),
            fields: self.fields.iter().chain(fields).cloned().collect(),
        }
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fatal records are always enabled.
    pub(crate) fn enabled(&self, level: Level) -> bool {
        level == Level::Fatal || level >= self.pipeline.min_level
    }

    pub(crate) fn log(&self, level: Level, message: &str, fields: &[Field], caller: Option<Caller>) {
        if !self.enabled(level) {
            return;
        }

        let stacktrace = (level >= self.pipeline.stacktrace_level)
            .then(|| Backtrace::force_capture().to_string());

        let entry = Entry {
            level,
            time: Local::now(),
            message,
            caller,
            stacktrace,
        };
        let line = self.pipeline.encoder.encode(&entry, &self.fields, fields);

        if let Err(e) = self.pipeline.sink.write_record(&line) {
            tracing::warn!(level = %level, error = %e, "failed to write log record");
        }
    }

    pub(crate) fn fatal(&self, message: &str, fields: &[Field], caller: Option<Caller>) -> ! {
        self.log(Level::Fatal, message, fields, caller);
        if let Err(e) = self.sync() {
            tracing::warn!(error = %e, "failed to flush before exit");
        }
        (self.pipeline.exit)(FATAL_EXIT_CODE)
    }

    pub(crate) fn sync(&self) -> io::Result<()> {
        self.pipeline.sink.sync()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("min_level", &self.pipeline.min_level)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}
