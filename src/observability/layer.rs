//! `tracing` events forwarded into a [`Logger`].

use std::fmt;

use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

use crate::domain::{Field, Level};
use crate::encoder::Caller;
use crate::logger::Logger;

/// A [`Layer`] that writes every `tracing` event as a logger record.
///
/// The event's `message` becomes the record message and its other fields
/// become record fields, alongside a `target` field. `TRACE` events are
/// written at debug level. Events emitted by this crate are skipped, so
/// diagnostics from a failing sink never loop back into the sink.
pub struct LoggerLayer {
    logger: Logger,
}

impl LoggerLayer {
    #[must_use]
    pub const fn new(logger: Logger) -> Self {
        Self { logger }
    }

    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        visitor
            .fields
            .push(Field::string("target", metadata.target()));

        let caller = metadata
            .file()
            .zip(metadata.line())
            .map(|(file, line)| Caller { file, line });

        // Fatal is unreachable from tracing levels, so this never exits.
        self.logger
            .log_at(level, &visitor.message, &visitor.fields, caller);
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<Field>,
}

impl EventVisitor {
    fn push(&mut self, field: &TracingField, value: Field) {
        if field.name() == "message" {
            return;
        }
        self.fields.push(value);
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push(field, Field::string(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, Field::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, Field::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, Field::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, Field::bool(field.name(), value));
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Field::string(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push(field, Field::string(field.name(), format!("{value:?}")));
        }
    }
}
