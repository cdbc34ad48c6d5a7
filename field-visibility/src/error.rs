//! Error types for registration and configuration.
//!
//! Visibility evaluation itself never fails: missing information resolves to
//! "not visible". Errors here describe structural problems that are reported
//! when a schema or policy is registered, or when a single rule-set field
//! cannot be read.

use thiserror::Error;

/// Errors raised by schema registration, policy configuration, and rule-set decoding.
///
/// Messages name fields and schemas, never field values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VisibilityError {
    /// A declared field/rule-set pairing is malformed.
    #[error("invalid pairing in schema `{schema}`: {reason}")]
    InvalidPairing { schema: String, reason: String },

    /// A rule-set field holds a value that cannot be read as a rule set.
    #[error("rule-set field `{field}` cannot be read as a bitset (bits {bits:#x})")]
    UnreadableRuleSet { field: String, bits: u64 },

    /// The redaction policy failed validation.
    #[error("invalid redaction policy: {0}")]
    InvalidPolicy(String),

    /// The process-wide redaction policy was already installed.
    #[error("redaction policy is already installed")]
    PolicyAlreadyInstalled,
}

impl VisibilityError {
    pub(crate) fn pairing(schema: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPairing {
            schema: schema.to_owned(),
            reason: reason.into(),
        }
    }
}
