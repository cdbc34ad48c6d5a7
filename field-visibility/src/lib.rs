//! Field-level visibility rules for records.
//!
//! This crate decides, per field and per request, whether a record field is
//! shown as-is or replaced by a placeholder. It separates:
//! - **Rules**: which flags guard a field (`all`, `all_<attr>`, `all_not_<attr>`,
//!   `share_<attr>`), stored in a [`RuleSet`] next to the field.
//! - **Evaluation**: whether a [`Principal`] satisfies a rule set, given the
//!   record owner ([`is_visible`], [`evaluate`]).
//! - **Redaction**: what a hidden value becomes ([`RedactionPolicy`], redaction hooks).
//!
//! Filtering happens once, where records leave storage ([`RecordFilter`],
//! [`GuardedSource`]). Edit surfaces use [`editable_fields`], which shares the
//! filter's decisions.
//!
//! Key rules:
//! - Pair a data field with its rule-set field using `#[visibility(rules = field)]`,
//!   or declare pairings on a [`Schema`] for dynamic [`Record`]s.
//! - Unpaired fields pass through unchanged.
//! - An empty rule set hides its field. Missing attributes never grant visibility.
//! - Blank values of hidden fields stay blank unless the policy hides empty fields.
//!
//! What this crate does not do:
//! - authenticate principals or store group memberships
//! - load or persist records
//! - encrypt data
//!
//! The `Guarded` derive macro lives in `field-visibility-derive` and is re-exported here.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::len_without_is_empty,
    clippy::new_without_default
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub use field_visibility_derive::Guarded;

#[allow(unused_extern_crates)]
extern crate self as field_visibility;

mod error;
mod principal;
mod record;
mod rules;
mod schema;
#[cfg(feature = "slog")]
pub mod slog;
mod store;
mod value;
mod visibility;

pub use error::VisibilityError;
pub use principal::{AttributeSource, AttributeValue, Attributes, GroupSet, OwnerRef, Principal};
pub use record::{FieldGuard, Guarded, Record, Redactions};
pub use rules::{AsRuleSet, Rule, RuleBits, RuleSet, RuleVocabulary, ALL};
pub use schema::{HideFn, Schema, SchemaBuilder};
pub use store::{Editable, GuardedSource, RecordSource};
pub use value::FieldValue;
pub use visibility::{
    decide, editable_fields, evaluate, is_visible, Decisions, FieldDecision, FieldFault, Filtered,
    RecordFilter, RedactionPolicy, Verdict, HIDDEN_PLACEHOLDER,
};
