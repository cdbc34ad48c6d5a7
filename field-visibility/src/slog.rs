//! Adapters for emitting filtered records through `slog`.
//!
//! This module connects [`RecordFilter`] with `slog` so records can be logged
//! in the form a given principal would see them. The logged value is always
//! derived from the filtered record, never from the original.
//!
//! Serialization failures are represented as placeholder strings rather than
//! propagated as errors.
//!
//! It does not configure `slog`; attach a logger to the filter with
//! [`RecordFilter::with_logger`] to log individual decisions.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    principal::Principal,
    record::Guarded,
    visibility::{FieldDecision, RecordFilter},
};

/// A `slog::Value` holding a filtered record as structured JSON.
pub struct FilteredJson {
    value: JsonValue,
}

impl FilteredJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The JSON payload that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for FilteredJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts records into a `slog::Value` that logs their filtered form as JSON.
///
/// ## Example
/// ```ignore
/// use field_visibility::slog::IntoFilteredJson;
///
/// info!(logger, "profile loaded"; "profile" => profile.into_filtered_json(&filter, &viewer));
/// ```
pub trait IntoFilteredJson: Guarded + Serialize {
    /// Filters `self` for `principal` and returns a `slog::Value` of the result.
    ///
    /// If the filtered record cannot be converted into JSON, the value is the
    /// string `"Failed to serialize filtered record"`.
    fn into_filtered_json(self, filter: &RecordFilter, principal: &Principal) -> FilteredJson {
        let filtered = filter.filter(self, principal);
        let json_value = serde_json::to_value(filtered).unwrap_or_else(|_| {
            JsonValue::String("Failed to serialize filtered record".to_string())
        });
        FilteredJson::new(json_value)
    }
}

impl<T> IntoFilteredJson for T where T: Guarded + Serialize {}

impl SlogValue for FieldDecision {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let json_value = serde_json::to_value(self).unwrap_or(JsonValue::Null);
        SlogValue::serialize(&slog::Serde(json_value), record, key, serializer)
    }
}
