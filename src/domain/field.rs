//! Typed structured fields attached to log records.

use std::borrow::Cow;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Value half of a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Rendered per environment: a human string in development, float seconds
    /// in production.
    Duration(Duration),
    /// Display text of an error value.
    Error(String),
    /// Arbitrary serialized data.
    Json(JsonValue),
}

/// A named, typed key/value pair attached to a single record.
///
/// # Example
///
/// ```
/// use rhino_logger::Field;
/// use std::time::Duration;
///
/// let fields = [
///     Field::string("order", "A-17"),
///     Field::uint("items", 3),
///     Field::duration("latency", Duration::from_millis(12)),
/// ];
/// assert_eq!(fields[0].key(), "order");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: Cow<'static, str>,
    value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// An `error` field holding the display text of `err`.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }

    /// Serializes `value` with serde. Values that fail to serialize are recorded
    /// as the serialization error text.
    pub fn any<T>(key: impl Into<Cow<'static, str>>, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_value(value)
            .unwrap_or_else(|e| JsonValue::String(format!("unserializable value: {e}")));
        Self::new(key, FieldValue::Json(json))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }
}
