//! Test: Protecting a type that does not implement `FieldValue` should fail.
//!
//! Wrap foreign types in a local newtype that implements `FieldValue`.

use std::time::SystemTime;

use field_visibility::{Guarded, RuleSet};

#[derive(Clone, Guarded)]
struct Session {
    // ERROR: SystemTime is not a FieldValue
    #[visibility(rules = visibility_started)]
    started: SystemTime,
    visibility_started: RuleSet,
}

fn main() {}
