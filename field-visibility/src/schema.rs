//! Schema registration for dynamic records.
//!
//! A schema declares, once, which rule-set field guards which data field.
//! Declarations are validated when the schema is built, so a typo surfaces at
//! registration instead of silently leaving a field unprotected. Derived
//! records get the same checks at compile time from `#[derive(Guarded)]`.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::VisibilityError;

/// A custom redaction hook: `(field, raw text) -> replacement`.
///
/// Returning `None` falls back to the policy placeholder.
pub type HideFn = fn(&str, &str) -> Option<String>;

/// A validated set of field/rule-set pairings for one record type.
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    pairings: BTreeMap<String, String>,
    hide: Option<HideFn>,
}

impl Schema {
    /// Starts declaring a schema named `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            pairings: Vec::new(),
            hide: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rule-set field paired with `target`.
    pub fn rules_field(&self, target: &str) -> Option<&str> {
        self.pairings.get(target).map(String::as_str)
    }

    /// Iterates `(target, rule-set field)` pairs in target order.
    pub fn pairings(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.pairings
            .iter()
            .map(|(target, rules)| (target.as_str(), rules.as_str()))
    }

    pub fn is_protected(&self, field: &str) -> bool {
        self.pairings.contains_key(field)
    }

    pub fn hide_fn(&self) -> Option<HideFn> {
        self.hide
    }
}

/// Collects pairings for a [`Schema`]. See [`Schema::builder`].
#[derive(Clone, Debug)]
#[must_use]
pub struct SchemaBuilder {
    name: String,
    pairings: Vec<(String, String)>,
    hide: Option<HideFn>,
}

impl SchemaBuilder {
    /// Declares that `rules_field` guards `target`.
    pub fn protect(mut self, target: impl Into<String>, rules_field: impl Into<String>) -> Self {
        self.pairings.push((target.into(), rules_field.into()));
        self
    }

    /// Pairs every field `x` in `fields` with `<prefix>x` when that field also exists.
    ///
    /// This reads the `visibility_x` / `visibility__x` naming convention once,
    /// at registration.
    pub fn protect_by_prefix<I, S>(mut self, fields: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: BTreeSet<String> = fields
            .into_iter()
            .map(|field| field.as_ref().to_owned())
            .collect();
        for field in &fields {
            if field.starts_with(prefix) {
                continue;
            }
            let rules_field = format!("{prefix}{field}");
            if fields.contains(&rules_field) {
                self.pairings.push((field.clone(), rules_field));
            }
        }
        self
    }

    /// Registers a custom redaction hook for records of this schema.
    pub fn hide_with(mut self, hook: HideFn) -> Self {
        self.hide = Some(hook);
        self
    }

    /// Validates the declared pairings and builds the schema.
    pub fn build(self) -> Result<Schema, VisibilityError> {
        let Self {
            name,
            pairings: declared,
            hide,
        } = self;

        let mut pairings = BTreeMap::new();
        let mut rule_fields = BTreeSet::new();
        for (target, rules) in declared {
            if target.is_empty() || rules.is_empty() {
                return Err(VisibilityError::pairing(&name, "field names must not be empty"));
            }
            if target == rules {
                return Err(VisibilityError::pairing(
                    &name,
                    format!("field `{target}` cannot guard itself"),
                ));
            }
            if !rule_fields.insert(rules.clone()) {
                return Err(VisibilityError::pairing(
                    &name,
                    format!("rule-set field `{rules}` is paired with more than one field"),
                ));
            }
            if pairings.insert(target.clone(), rules).is_some() {
                return Err(VisibilityError::pairing(
                    &name,
                    format!("field `{target}` is declared more than once"),
                ));
            }
        }

        if let Some(overlap) = pairings.keys().find(|target| rule_fields.contains(*target)) {
            return Err(VisibilityError::pairing(
                &name,
                format!("rule-set field `{overlap}` cannot itself be protected"),
            ));
        }

        Ok(Schema {
            name,
            pairings,
            hide,
        })
    }
}
