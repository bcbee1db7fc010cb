//! Request-scoped context values.
//!
//! A [`Context`] is an immutable bag of values attached to a unit of work (an
//! HTTP request, a job). Values are addressed through typed [`ContextKey`]s, so a
//! read always names the type it expects and a value stored under the same name
//! with another type reads as absent.
//!
//! ```
//! use rhino_logger::context::{Context, ContextKey, REQUEST_ID};
//!
//! let ctx = Context::new().with_value(&REQUEST_ID, "r1".to_string());
//! assert_eq!(ctx.value(&REQUEST_ID).map(String::as_str), Some("r1"));
//!
//! let attempt: ContextKey<u32> = ContextKey::new("attempt");
//! assert_eq!(ctx.value(&attempt), None);
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Key under which the request identifier is stored by default.
pub const REQUEST_ID: ContextKey<String> = ContextKey::new("request_id");

/// Key under which the user identifier is stored by default.
pub const USER_ID: ContextKey<String> = ContextKey::new("user_id");

/// Typed handle to a context slot.
pub struct ContextKey<T> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _marker: PhantomData,
        }
    }

    /// A key whose name is only known at runtime.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

type Slot = Arc<dyn Any + Send + Sync>;

/// Immutable, cheaply cloneable request context.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<String, Slot>>,
}

impl Context {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this context with `value` stored under `key`.
    ///
    /// The receiver is left unchanged.
    #[must_use]
    pub fn with_value<T>(&self, key: &ContextKey<T>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        let mut values: HashMap<String, Slot> = (*self.values).clone();
        values.insert(key.name().to_string(), Arc::new(value));
        Self {
            values: Arc::new(values),
        }
    }

    /// Shorthand for storing a request id under [`REQUEST_ID`].
    #[must_use]
    pub fn with_request_id(&self, id: impl Into<String>) -> Self {
        self.with_value(&REQUEST_ID, id.into())
    }

    /// Shorthand for storing a user id under [`USER_ID`].
    #[must_use]
    pub fn with_user_id(&self, id: impl Into<String>) -> Self {
        self.with_value(&USER_ID, id.into())
    }

    /// Reads the value stored under `key`, if it has type `T`.
    #[must_use]
    pub fn value<T>(&self, key: &ContextKey<T>) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.values.get(key.name())?.downcast_ref::<T>()
    }

    /// Reads a string stored under `name` as either `String` or `&'static str`.
    pub(crate) fn string_value(&self, name: &str) -> Option<&str> {
        let slot = self.values.get(name)?;
        slot.downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| slot.downcast_ref::<&'static str>().copied())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_value_does_not_touch_the_parent() {
        let parent = Context::new().with_request_id("r1");
        let child = parent.with_user_id("u1");

        assert!(!parent.contains("user_id"));
        assert_eq!(child.value(&USER_ID).map(String::as_str), Some("u1"));
        assert_eq!(child.value(&REQUEST_ID).map(String::as_str), Some("r1"));
    }

    #[test]
    fn wrong_type_reads_as_absent() {
        let numeric: ContextKey<u64> = ContextKey::new("request_id");
        let ctx = Context::new().with_value(&numeric, 42);

        assert_eq!(ctx.value(&REQUEST_ID), None);
        assert_eq!(ctx.value(&numeric), Some(&42));
        assert_eq!(ctx.string_value("request_id"), None);
    }

    #[test]
    fn string_value_accepts_static_str() {
        let key: ContextKey<&'static str> = ContextKey::new("tenant");
        let ctx = Context::new().with_value(&key, "acme");
        assert_eq!(ctx.string_value("tenant"), Some("acme"));
    }

    #[test]
    fn runtime_named_keys_match_const_keys() {
        let key: ContextKey<String> = ContextKey::named(String::from("request_id"));
        let ctx = Context::new().with_request_id("r9");
        assert_eq!(ctx.value(&key).map(String::as_str), Some("r9"));
    }
}
