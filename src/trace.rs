//! Start/finish timing of a named unit of work.

use std::time::{Duration, Instant};

use crate::domain::{Field, Level};
use crate::encoder::Caller;
use crate::logger::Logger;

/// An open timing span created by [`Logger::trace`].
///
/// Finishing happens exactly once: either explicitly through
/// [`finish`](Self::finish) or when the span is dropped. Both records are
/// emitted at debug level, so production loggers drop them.
#[must_use = "dropping the span immediately records a zero-length duration"]
pub struct TraceSpan {
    logger: Logger,
    function: String,
    started: Instant,
    caller: Caller,
    finished: bool,
}

impl TraceSpan {
    pub(crate) fn start(logger: Logger, function: &str, caller: Caller) -> Self {
        let started = logger.clock().now();
        logger.log_at(
            Level::Debug,
            "Starting function",
            &[Field::string("function", function.to_string())],
            Some(caller),
        );
        Self {
            logger,
            function: function.to_string(),
            started,
            caller,
            finished: false,
        }
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Time since the span started, according to the logger's clock.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.logger
            .clock()
            .now()
            .saturating_duration_since(self.started)
    }

    /// Emits the "Finished function" record and returns the measured duration.
    pub fn finish(mut self) -> Duration {
        self.complete()
    }

    fn complete(&mut self) -> Duration {
        let elapsed = self.elapsed();
        if !self.finished {
            self.finished = true;
            self.logger.log_at(
                Level::Debug,
                "Finished function",
                &[
                    Field::string("function", self.function.clone()),
                    Field::duration("duration", elapsed),
                ],
                Some(self.caller),
            );
        }
        elapsed
    }
}

impl Drop for TraceSpan {
    fn drop(&mut self) {
        self.complete();
    }
}

impl std::fmt::Debug for TraceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSpan")
            .field("function", &self.function)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
