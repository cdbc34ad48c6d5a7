//! Test: One rule-set field guarding two fields should fail.

use field_visibility::{Guarded, RuleSet};

#[derive(Clone, Guarded)]
struct Profile {
    #[visibility(rules = visibility)]
    email: String,
    // ERROR: `visibility` already guards `email`
    #[visibility(rules = visibility)]
    phone: String,
    visibility: RuleSet,
}

fn main() {}
