//! Visibility evaluation, redaction, and field projection.
//!
//! - **`evaluate`**: rule evaluation against a principal and an owner (`is_visible`, `Verdict`)
//! - **`policy`**: what a hidden value turns into (`RedactionPolicy`)
//! - **`filter`**: the record filter applying both (`RecordFilter`, `decide`)
//! - **`editable`**: the edit-surface field list derived from the same decisions
//!
//! Rule sets live in `crate::rules`; principals in `crate::principal`.

mod editable;
mod evaluate;
mod filter;
mod policy;

pub use editable::editable_fields;
pub use evaluate::{evaluate, is_visible, Verdict};
pub use filter::{decide, Decisions, FieldDecision, FieldFault, Filtered, RecordFilter};
pub use policy::{RedactionPolicy, HIDDEN_PLACEHOLDER};
