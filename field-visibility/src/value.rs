//! Protected field values.
//!
//! The filter needs three things from a protected value: a text view to pass
//! to redaction hooks, a blank check for the empty-field exception, and a way
//! to rebuild the value from its redacted text.

use std::borrow::Cow;

/// Values that can sit behind a rule set.
///
/// ## Foreign value types
///
/// Rust's orphan rules prevent implementing this trait for types from other
/// crates. Wrap such values in a local newtype and implement `FieldValue` for
/// the wrapper.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `FieldValue`",
    label = "this type cannot be protected by a rule set",
    note = "protected fields hold string-like values such as `String` or `Option<String>`"
)]
pub trait FieldValue {
    /// Text view of the value, as seen by redaction hooks.
    fn as_text(&self) -> Cow<'_, str>;

    /// Whether the value is empty or whitespace only.
    fn is_blank(&self) -> bool {
        self.as_text().trim().is_empty()
    }

    /// Rebuilds a value of this type from redacted text.
    #[must_use]
    fn from_redacted(redacted: String) -> Self
    where
        Self: Sized;
}

impl FieldValue for String {
    fn as_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    fn from_redacted(redacted: String) -> Self {
        redacted
    }
}

impl FieldValue for Cow<'_, str> {
    fn as_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_ref())
    }

    fn from_redacted(redacted: String) -> Self {
        Cow::Owned(redacted)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn as_text(&self) -> Cow<'_, str> {
        self.as_ref()
            .map_or(Cow::Borrowed(""), FieldValue::as_text)
    }

    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, FieldValue::is_blank)
    }

    fn from_redacted(redacted: String) -> Self {
        Some(T::from_redacted(redacted))
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn as_text(&self) -> Cow<'_, str> {
        (**self).as_text()
    }

    fn is_blank(&self) -> bool {
        (**self).is_blank()
    }

    fn from_redacted(redacted: String) -> Self {
        Box::new(T::from_redacted(redacted))
    }
}

#[cfg(feature = "json")]
impl FieldValue for serde_json::Value {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            serde_json::Value::Null => Cow::Borrowed(""),
            serde_json::Value::String(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::String(text) => text.trim().is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => false,
        }
    }

    fn from_redacted(redacted: String) -> Self {
        serde_json::Value::String(redacted)
    }
}
