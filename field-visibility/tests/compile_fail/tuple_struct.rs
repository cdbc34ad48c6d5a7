//! Test: Deriving on a tuple struct should fail.
//!
//! Pairings are declared by field name, so fields must be named.

use field_visibility::{Guarded, RuleSet};

// ERROR: tuple structs have no field names to pair
#[derive(Clone, Guarded)]
struct Profile(String, RuleSet);

fn main() {}
