//! JSON record encoder.
//!
//! Every record is encoded as one JSON object per line:
//!
//! ```json
//! {"level":"info","time":"2024-05-01 10:15:42.117+0200","caller":"src/main.rs:42","message":"hello","env":"development","service":"rhino_logger","version":"v1.0.0","k":"v"}
//! ```
//!
//! Keys appear in a fixed order: level, time, caller, message, the logger's
//! pre-attached fields, the call's fields, and finally the stack trace when one
//! was captured. A field whose key repeats an earlier field key replaces its
//! value. A field named like one of the fixed keys never replaces it; it is
//! written under `fields.<key>` instead:
//!
//! ```json
//! {"level":"info","time":"...","message":"order placed","fields.message":"user payload"}
//! ```

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value as JsonValue};

use crate::domain::{Environment, Field, FieldValue, Level};

/// Prefix for fields whose key collides with a fixed record key.
pub const RESERVED_PREFIX: &str = "fields.";

/// Source location of the logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    /// The caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    #[must_use]
    pub fn here() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// Last directory plus file name, e.g. `src/main.rs:42`.
    #[must_use]
    pub fn short(&self) -> String {
        let trimmed = self
            .file
            .rmatch_indices(|c: char| c == '/' || c == '\\')
            .nth(1)
            .map_or(self.file, |(idx, _)| &self.file[idx + 1..]);
        format!("{trimmed}:{}", self.line)
    }
}

/// How duration fields are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFormat {
    /// Human-readable text such as `1.5ms`.
    Text,
    /// Floating-point seconds such as `0.0015`.
    Seconds,
}

/// Key names and value formats used by [`JsonEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub level_key: &'static str,
    pub time_key: &'static str,
    pub caller_key: &'static str,
    pub message_key: &'static str,
    pub stacktrace_key: &'static str,
    pub duration_format: DurationFormat,
}

impl EncoderConfig {
    /// Preset for `env`. Key names are shared; durations differ.
    #[must_use]
    pub const fn for_env(env: Environment) -> Self {
        let duration_format = match env {
            Environment::Development => DurationFormat::Text,
            Environment::Production => DurationFormat::Seconds,
        };
        Self {
            level_key: "level",
            time_key: "time",
            caller_key: "caller",
            message_key: "message",
            stacktrace_key: "stacktrace",
            duration_format,
        }
    }
}

/// One record ready for encoding.
#[derive(Debug)]
pub struct Entry<'a> {
    pub level: Level,
    pub time: DateTime<Local>,
    pub message: &'a str,
    pub caller: Option<Caller>,
    pub stacktrace: Option<String>,
}

/// Encodes records as single-line JSON objects.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    #[must_use]
    pub const fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes `entry` with the logger's pre-attached `context` fields and the
    /// call's `fields`, newline-terminated.
    #[must_use]
    pub fn encode(&self, entry: &Entry<'_>, context: &[Field], fields: &[Field]) -> Vec<u8> {
        let cfg = &self.config;
        let mut object = Map::new();

        object.insert(cfg.level_key.into(), entry.level.as_str().into());
        object.insert(cfg.time_key.into(), format_time(&entry.time).into());
        if let Some(caller) = entry.caller {
            object.insert(cfg.caller_key.into(), caller.short().into());
        }
        object.insert(cfg.message_key.into(), entry.message.into());

        for field in context.iter().chain(fields) {
            object.insert(self.field_key(field.key()), self.field_value(field.value()));
        }

        if let Some(stack) = &entry.stacktrace {
            object.insert(cfg.stacktrace_key.into(), stack.as_str().into());
        }

        let mut line = JsonValue::Object(object).to_string().into_bytes();
        line.push(b'\n');
        line
    }

    fn is_reserved(&self, key: &str) -> bool {
        let cfg = &self.config;
        [
            cfg.level_key,
            cfg.time_key,
            cfg.caller_key,
            cfg.message_key,
            cfg.stacktrace_key,
        ]
        .contains(&key)
    }

    fn field_key(&self, key: &str) -> String {
        if self.is_reserved(key) {
            format!("{RESERVED_PREFIX}{key}")
        } else {
            key.to_string()
        }
    }

    fn field_value(&self, value: &FieldValue) -> JsonValue {
        match value {
            FieldValue::String(s) | FieldValue::Error(s) => JsonValue::String(s.clone()),
            FieldValue::Int(i) => (*i).into(),
            FieldValue::Uint(u) => (*u).into(),
            FieldValue::Float(f) => float_value(*f),
            FieldValue::Bool(b) => (*b).into(),
            FieldValue::Duration(d) => self.duration_value(*d),
            FieldValue::Json(v) => v.clone(),
        }
    }

    fn duration_value(&self, d: Duration) -> JsonValue {
        match self.config.duration_format {
            DurationFormat::Text => JsonValue::String(format!("{d:?}")),
            DurationFormat::Seconds => float_value(d.as_secs_f64()),
        }
    }
}

/// NaN and infinities are not valid JSON numbers and are written as strings.
fn float_value(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f).map_or_else(|| JsonValue::String(f.to_string()), JsonValue::Number)
}

/// Formats `t` as `YYYY-MM-DD HH:MM:SS.mmm` followed by `Z` for UTC or a
/// `+hhmm` offset.
pub fn format_time<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    use chrono::Offset;

    let base = t.format("%Y-%m-%d %H:%M:%S%.3f");
    if t.offset().fix().local_minus_utc() == 0 {
        format!("{base}Z")
    } else {
        format!("{base}{}", t.format("%z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn entry(message: &str) -> Entry<'_> {
        Entry {
            level: Level::Info,
            time: Local::now(),
            message,
            caller: Some(Caller {
                file: "src/service/handler.rs",
                line: 42,
            }),
            stacktrace: None,
        }
    }

    fn decode(line: &[u8]) -> JsonValue {
        assert_eq!(line.last(), Some(&b'\n'));
        serde_json::from_slice(line).unwrap()
    }

    #[test]
    fn formats_utc_with_z_suffix() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 42).unwrap()
            + chrono::Duration::milliseconds(117);
        assert_eq!(format_time(&t), "2024-05-01 10:15:42.117Z");
    }

    #[test]
    fn formats_offsets_without_colon() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let t = tz.with_ymd_and_hms(2024, 5, 1, 10, 15, 42).unwrap();
        assert_eq!(format_time(&t), "2024-05-01 10:15:42.000+0200");
    }

    #[test]
    fn caller_keeps_last_directory() {
        let caller = Caller {
            file: "src/service/handler.rs",
            line: 42,
        };
        assert_eq!(caller.short(), "service/handler.rs:42");

        let bare = Caller {
            file: "main.rs",
            line: 7,
        };
        assert_eq!(bare.short(), "main.rs:7");
    }

    #[test]
    fn keys_follow_fixed_order() {
        let encoder = JsonEncoder::new(EncoderConfig::for_env(Environment::Development));
        let mut e = entry("hello");
        e.stacktrace = Some("frame 0".to_string());

        let line = encoder.encode(&e, &[Field::string("env", "development")], &[Field::string("k", "v")]);
        let value = decode(&line);
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            ["level", "time", "caller", "message", "env", "k", "stacktrace"]
        );
        assert_eq!(value["caller"], "service/handler.rs:42");
    }

    #[test]
    fn durations_follow_the_environment() {
        let fields = [Field::duration("duration", Duration::from_millis(1500))];

        let dev = JsonEncoder::new(EncoderConfig::for_env(Environment::Development));
        assert_eq!(decode(&dev.encode(&entry("x"), &[], &fields))["duration"], "1.5s");

        let prod = JsonEncoder::new(EncoderConfig::for_env(Environment::Production));
        assert_eq!(decode(&prod.encode(&entry("x"), &[], &fields))["duration"], 1.5);
    }

    #[test]
    fn non_finite_floats_become_strings() {
        let encoder = JsonEncoder::new(EncoderConfig::for_env(Environment::Production));
        let line = encoder.encode(&entry("x"), &[], &[Field::float("ratio", f64::NAN)]);
        assert_eq!(decode(&line)["ratio"], "NaN");
    }

    #[test]
    fn call_fields_override_context_fields() {
        let encoder = JsonEncoder::new(EncoderConfig::for_env(Environment::Production));
        let line = encoder.encode(
            &entry("x"),
            &[Field::string("user_id", "old")],
            &[Field::string("user_id", "new")],
        );
        assert_eq!(decode(&line)["user_id"], "new");
    }

    #[test]
    fn fields_never_replace_fixed_keys() {
        let encoder = JsonEncoder::new(EncoderConfig::for_env(Environment::Development));
        let mut e = entry("order placed");
        e.level = Level::Error;
        e.stacktrace = Some("frame 0".to_string());

        let line = encoder.encode(
            &e,
            &[Field::string("time", "yesterday")],
            &[
                Field::string("message", "user payload"),
                Field::string("level", "custom"),
                Field::string("caller", "elsewhere"),
                Field::string("stacktrace", "user frames"),
            ],
        );
        let value = decode(&line);

        assert_eq!(value["level"], "error");
        assert_eq!(value["message"], "order placed");
        assert_eq!(value["caller"], "service/handler.rs:42");
        assert_eq!(value["stacktrace"], "frame 0");
        assert!(value["time"].as_str().unwrap().starts_with("20"));
        assert_eq!(value["fields.message"], "user payload");
        assert_eq!(value["fields.level"], "custom");
        assert_eq!(value["fields.caller"], "elsewhere");
        assert_eq!(value["fields.stacktrace"], "user frames");
        assert_eq!(value["fields.time"], "yesterday");
    }
}
