//! Test: Naming a rule-set field that does not exist should fail.
//!
//! A typo in the pairing would otherwise leave the field unguarded.

use field_visibility::{Guarded, RuleSet};

#[derive(Clone, Guarded)]
struct Profile {
    // ERROR: there is no field named `visibility_mail`
    #[visibility(rules = visibility_mail)]
    email: String,
    visibility_email: RuleSet,
}

fn main() {}
