//! Integration tests for the slog module.
//!
//! These tests verify that:
//! - `into_filtered_json()` produces the record as the principal would see it
//! - The `slog::Value` implementations work with slog's serialization API
//! - A filter with a logger reports hidden fields and faults without values

#![cfg(feature = "slog")]

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Arguments,
    sync::{Arc, Mutex},
};

use field_visibility::{
    decide, slog::IntoFilteredJson, Attributes, Guarded, Principal, RecordFilter,
    RedactionPolicy, RuleBits, RuleSet, RuleVocabulary,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{o, Drain, KV};

// A test serializer that captures serialized key-value pairs
struct CapturingSerializer {
    captured: RefCell<HashMap<String, CapturedValue>>,
}

#[derive(Debug, Clone, PartialEq)]
enum CapturedValue {
    Str(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Unit,
    None,
    // For nested serde values, we capture the JSON representation
    Serde(JsonValue),
}

impl CapturingSerializer {
    fn new() -> Self {
        Self {
            captured: RefCell::new(HashMap::new()),
        }
    }

    fn get(&self, key: &str) -> Option<CapturedValue> {
        self.captured.borrow().get(key).cloned()
    }
}

impl slog::Serializer for CapturingSerializer {
    fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Str(val.to_string()));
        Ok(())
    }

    fn emit_str(&mut self, key: slog::Key, val: &str) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Str(val.into()));
        Ok(())
    }

    fn emit_bool(&mut self, key: slog::Key, val: bool) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Bool(val));
        Ok(())
    }

    fn emit_i64(&mut self, key: slog::Key, val: i64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::I64(val));
        Ok(())
    }

    fn emit_u64(&mut self, key: slog::Key, val: u64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::U64(val));
        Ok(())
    }

    fn emit_f64(&mut self, key: slog::Key, val: f64) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::F64(val));
        Ok(())
    }

    fn emit_unit(&mut self, key: slog::Key) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Unit);
        Ok(())
    }

    fn emit_none(&mut self, key: slog::Key) -> slog::Result {
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::None);
        Ok(())
    }

    fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
        // Serialize the value to JSON to capture it
        let json = serde_json::to_value(val.as_serde()).unwrap_or(JsonValue::Null);
        self.captured
            .borrow_mut()
            .insert(key.into(), CapturedValue::Serde(json));
        Ok(())
    }
}

/// Helper function to serialize a slog::Value into any Serializer.
fn serialize_to_capture<V: slog::Value, S: slog::Serializer>(
    value: &V,
    key: &'static str,
    serializer: &mut S,
) {
    // The record is created and used in a single expression to avoid lifetime issues
    static RS: slog::RecordStatic<'static> = slog::record_static!(slog::Level::Info, "");
    // We need to ensure format_args! result lives long enough
    let args = format_args!("");
    let record = slog::Record::new(&RS, &args, slog::b!());
    value.serialize(&record, key, serializer).unwrap();
}

/// A drain that keeps every record's level, message and key-value pairs.
#[derive(Clone, Default)]
struct CapturingDrain {
    records: Arc<Mutex<Vec<(slog::Level, String, HashMap<String, CapturedValue>)>>>,
}

impl Drain for CapturingDrain {
    type Ok = ();
    type Err = slog::Never;

    fn log(
        &self,
        record: &slog::Record<'_>,
        _values: &slog::OwnedKVList,
    ) -> Result<(), slog::Never> {
        let mut serializer = CapturingSerializer::new();
        record
            .kv()
            .serialize(record, &mut serializer)
            .expect("capturing serializer never fails");
        self.records.lock().expect("drain lock").push((
            record.level(),
            record.msg().to_string(),
            serializer.captured.into_inner(),
        ));
        Ok(())
    }
}

static CONTACT_RULES: RuleVocabulary = RuleVocabulary::new(&["all", "all_is_staff"]);

#[derive(Clone, Guarded, Serialize)]
struct Contact {
    name: String,
    #[visibility(rules = email_rules)]
    email: String,
    #[serde(skip)]
    email_rules: RuleSet,
    #[visibility(rules = phone_rules)]
    phone: String,
    #[serde(skip)]
    phone_rules: RuleBits,
}

fn contact(phone_bits: u64) -> Contact {
    Contact {
        name: "Jo".into(),
        email: "jo@example.com".into(),
        email_rules: ["all_is_staff"].into_iter().collect(),
        phone: "555-0100".into(),
        phone_rules: RuleBits::new(phone_bits, &CONTACT_RULES),
    }
}

fn staff() -> Principal {
    Principal::new("s-1", Attributes::new().with_flag("is_staff", true))
}

#[test]
fn filtered_json_hides_values_from_principal() {
    let filter = RecordFilter::with_policy(RedactionPolicy::default()).unwrap();
    let value = contact(0b10).into_filtered_json(&filter, &Principal::anonymous());
    assert_eq!(value.as_json()["email"], "<Hidden>");

    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(&value, "contact", &mut serializer);

    if let Some(CapturedValue::Serde(json)) = serializer.get("contact") {
        assert_eq!(json["name"], "Jo");
        assert_eq!(json["email"], "<Hidden>");
        assert_eq!(json["phone"], "<Hidden>");
    } else {
        panic!("Expected Serde value for 'contact' key");
    }
}

#[test]
fn filtered_json_keeps_values_the_principal_may_see() {
    let filter = RecordFilter::with_policy(RedactionPolicy::default()).unwrap();
    let value = contact(0b10).into_filtered_json(&filter, &staff());
    assert_eq!(value.as_json()["email"], "jo@example.com");
    assert_eq!(value.as_json()["phone"], "555-0100");
}

#[test]
fn field_decision_serializes_as_json() {
    let decisions = decide(&contact(0b1), &staff());
    let decision = decisions.get("phone").unwrap();

    let mut serializer = CapturingSerializer::new();
    serialize_to_capture(decision, "decision", &mut serializer);

    if let Some(CapturedValue::Serde(json)) = serializer.get("decision") {
        assert_eq!(json["field"], "phone");
        assert_eq!(json["rules_field"], "phone_rules");
        assert_eq!(json["visible"], true);
        assert_eq!(json["granted_by"], "all");
    } else {
        panic!("Expected Serde value for 'decision' key");
    }
}

#[test]
fn filter_logs_hidden_fields_and_faults_without_values() {
    let drain = CapturingDrain::default();
    let logger = slog::Logger::root(drain.clone(), o!());
    let filter = RecordFilter::with_policy(RedactionPolicy::default()).unwrap().with_logger(logger);

    let filtered = filter.filter(contact(1 << 9), &Principal::anonymous());
    assert_eq!(filtered.phone, "<Hidden>");

    let records = drain.records.lock().unwrap();
    assert_eq!(records.len(), 3);

    let hidden: Vec<_> = records
        .iter()
        .filter(|(level, _, _)| *level == slog::Level::Debug)
        .collect();
    assert_eq!(hidden.len(), 2);
    for (_, message, values) in &hidden {
        assert_eq!(message, "field hidden");
        assert_eq!(
            values.get("principal"),
            Some(&CapturedValue::Str("anonymous".into()))
        );
        assert_eq!(
            values.get("record"),
            Some(&CapturedValue::Str("Contact".into()))
        );
    }

    let (level, message, values) = records
        .iter()
        .find(|(level, _, _)| *level == slog::Level::Warning)
        .expect("fault should be logged");
    assert_eq!(*level, slog::Level::Warning);
    assert_eq!(message, "rule set unreadable, field hidden");
    assert_eq!(values.get("field"), Some(&CapturedValue::Str("phone".into())));

    for (_, _, values) in records.iter() {
        for value in values.values() {
            assert_ne!(value, &CapturedValue::Str("jo@example.com".into()));
            assert_ne!(value, &CapturedValue::Str("555-0100".into()));
        }
    }
}

#[test]
fn filter_without_logger_is_silent() {
    let filter = RecordFilter::with_policy(RedactionPolicy::default()).unwrap();
    let filtered = filter.filter(contact(0), &staff());
    assert_eq!(filtered.email, "jo@example.com");
    assert_eq!(filtered.phone, "<Hidden>");
}
