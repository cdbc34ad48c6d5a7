//! Test: Protecting a scalar field should fail.
//!
//! Protected fields hold string-like values that can carry a placeholder.

use field_visibility::{Guarded, RuleSet};

#[derive(Clone, Guarded)]
struct Profile {
    // ERROR: u32 cannot hold "<Hidden>"
    #[visibility(rules = visibility_age)]
    age: u32,
    visibility_age: RuleSet,
}

fn main() {}
