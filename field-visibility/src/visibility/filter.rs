//! The record filter: the single point where hidden values are replaced.
//!
//! Run it once per record, where the record leaves storage (see
//! [`crate::GuardedSource`]). Everything downstream then sees the filtered
//! record only.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::VisibilityError,
    principal::Principal,
    record::{Guarded, Redactions},
    visibility::{
        evaluate::{evaluate, Verdict},
        policy::RedactionPolicy,
    },
};

/// The visibility decision for one protected field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDecision {
    /// The protected field.
    pub field: String,
    /// The rule-set field that guards it.
    pub rules_field: String,
    /// Whether the principal may see the value.
    pub visible: bool,
    /// The flag that granted visibility, when visible.
    pub granted_by: Option<String>,
}

/// A protected field whose rule set could not be read. The field is hidden.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldFault {
    pub field: String,
    pub error: VisibilityError,
}

/// Visibility decisions for every protected field of one record.
///
/// Produced by [`decide`]; shared by the filter and [`crate::editable_fields`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decisions {
    decisions: BTreeMap<String, FieldDecision>,
    faults: Vec<FieldFault>,
}

impl Decisions {
    /// Returns `false` only for protected fields that are hidden.
    pub fn is_visible(&self, field: &str) -> bool {
        self.decisions
            .get(field)
            .map_or(true, |decision| decision.visible)
    }

    pub fn is_protected(&self, field: &str) -> bool {
        self.decisions.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldDecision> {
        self.decisions.get(field)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &FieldDecision> + '_ {
        self.decisions.values().filter(|decision| !decision.visible)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDecision> + '_ {
        self.decisions.values()
    }

    pub fn faults(&self) -> &[FieldFault] {
        &self.faults
    }
}

/// Computes the visibility of every protected field of `record` for `principal`.
///
/// A field whose rule set cannot be read is hidden and recorded as a fault;
/// other fields are unaffected.
pub fn decide<T: Guarded>(record: &T, principal: &Principal) -> Decisions {
    let owner = record.owner();
    let mut decisions = Decisions::default();
    for guard in record.guards() {
        let (visible, granted_by) = match guard.rules() {
            Ok(rules) => match evaluate(Some(rules), principal, owner) {
                Verdict::Visible(rule) => (true, Some(rule.to_string())),
                Verdict::Hidden => (false, None),
            },
            Err(error) => {
                decisions.faults.push(FieldFault {
                    field: guard.field().to_owned(),
                    error: error.clone(),
                });
                (false, None)
            }
        };
        decisions.decisions.insert(
            guard.field().to_owned(),
            FieldDecision {
                field: guard.field().to_owned(),
                rules_field: guard.rules_field().to_owned(),
                visible,
                granted_by,
            },
        );
    }
    decisions
}

/// A filtered record with the decisions that produced it.
#[derive(Clone, Debug)]
pub struct Filtered<T> {
    pub record: T,
    pub decisions: Decisions,
    /// The fields whose values were replaced.
    pub redacted: Vec<String>,
}

impl<T> Filtered<T> {
    pub fn into_record(self) -> T {
        self.record
    }
}

/// Replaces the values of hidden fields according to a [`RedactionPolicy`].
#[derive(Clone, Debug)]
pub struct RecordFilter {
    policy: Arc<RedactionPolicy>,
    #[cfg(feature = "slog")]
    logger: Option<slog::Logger>,
}

impl RecordFilter {
    /// A filter using the process-wide policy ([`RedactionPolicy::global`]).
    pub fn new() -> Self {
        Self::from_validated(RedactionPolicy::global())
    }

    /// A filter using an explicit policy.
    ///
    /// Fails with [`VisibilityError::InvalidPolicy`] when the policy does not
    /// validate, the same way [`RedactionPolicy::install`] does.
    pub fn with_policy(
        policy: impl Into<Arc<RedactionPolicy>>,
    ) -> Result<Self, VisibilityError> {
        let policy = policy.into();
        policy.validate()?;
        Ok(Self::from_validated(policy))
    }

    fn from_validated(policy: Arc<RedactionPolicy>) -> Self {
        Self {
            policy,
            #[cfg(feature = "slog")]
            logger: None,
        }
    }

    /// Logs hidden fields at debug level and rule-set faults at warning level.
    /// Values are never logged.
    #[cfg(feature = "slog")]
    #[must_use]
    pub fn with_logger(mut self, logger: slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Filters `record` for `principal`.
    ///
    /// Unprotected fields and visible fields are returned unchanged.
    #[must_use]
    pub fn filter<T: Guarded>(&self, record: T, principal: &Principal) -> T {
        self.filter_with_report(record, principal).record
    }

    /// Filters `record` and returns the decisions alongside it.
    pub fn filter_with_report<T: Guarded>(
        &self,
        record: T,
        principal: &Principal,
    ) -> Filtered<T> {
        let decisions = decide(&record, principal);
        let redactions = self.redactions(&record, &decisions);
        self.log(&record, principal, &decisions);
        let redacted = redactions.fields().map(str::to_owned).collect();
        let record = if redactions.is_empty() {
            record
        } else {
            record.apply_redactions(&redactions)
        };
        Filtered {
            record,
            decisions,
            redacted,
        }
    }

    /// Computes the replacement value for each hidden field.
    ///
    /// A blank value is left as is unless the policy hides empty fields.
    /// Otherwise the record's hook answers first, then the placeholder.
    fn redactions<T: Guarded>(&self, record: &T, decisions: &Decisions) -> Redactions {
        let mut redactions = Redactions::new();
        for guard in record.guards() {
            if decisions.is_visible(guard.field()) {
                continue;
            }
            let value = guard.value();
            if value.is_blank() && !self.policy.hide_empty() {
                continue;
            }
            let replacement = record
                .hide(guard.field(), &value.as_text())
                .unwrap_or_else(|| self.policy.placeholder().to_owned());
            redactions.insert(guard.field(), replacement);
        }
        redactions
    }

    #[cfg(feature = "slog")]
    fn log<T: Guarded>(&self, record: &T, principal: &Principal, decisions: &Decisions) {
        let Some(logger) = &self.logger else {
            return;
        };
        for decision in decisions.hidden() {
            slog::debug!(logger, "field hidden";
                "record" => record.type_name(),
                "field" => &decision.field,
                "principal" => principal.id(),
            );
        }
        for fault in decisions.faults() {
            slog::warn!(logger, "rule set unreadable, field hidden";
                "record" => record.type_name(),
                "field" => &fault.field,
                "error" => %fault.error,
            );
        }
    }

    #[cfg(not(feature = "slog"))]
    #[allow(clippy::unused_self)]
    fn log<T: Guarded>(&self, _record: &T, _principal: &Principal, _decisions: &Decisions) {}
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new()
    }
}
