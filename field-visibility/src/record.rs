//! Records the filter can see into.
//!
//! [`Guarded`] is the capability the filter needs from a record: enumerate its
//! fields, expose each protected field with its rule set, optionally name an
//! owner and a redaction hook, and rebuild itself with some fields replaced.
//!
//! Two implementations are provided:
//! - `#[derive(Guarded)]` for structs, with pairings declared on the fields;
//! - [`Record`], a dynamic record whose pairings come from a [`Schema`].

use std::{borrow::Cow, collections::BTreeMap, sync::Arc};

use crate::{
    error::VisibilityError,
    principal::{AttributeSource, Principal},
    rules::RuleSet,
    schema::Schema,
    value::FieldValue,
};

/// One protected field, as seen by the filter.
pub struct FieldGuard<'a> {
    field: &'a str,
    rules_field: &'a str,
    rules: Result<Cow<'a, RuleSet>, VisibilityError>,
    value: &'a dyn FieldValue,
}

impl<'a> FieldGuard<'a> {
    pub fn new(
        field: &'a str,
        rules_field: &'a str,
        rules: Result<Cow<'a, RuleSet>, VisibilityError>,
        value: &'a dyn FieldValue,
    ) -> Self {
        Self {
            field,
            rules_field,
            rules,
            value,
        }
    }

    pub fn field(&self) -> &'a str {
        self.field
    }

    pub fn rules_field(&self) -> &'a str {
        self.rules_field
    }

    /// The decoded rule set, or the fault that prevented decoding.
    pub fn rules(&self) -> Result<&RuleSet, &VisibilityError> {
        self.rules.as_ref().map(|rules| &**rules)
    }

    pub fn value(&self) -> &'a dyn FieldValue {
        self.value
    }
}

/// Replacement values for hidden fields, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redactions {
    values: BTreeMap<String, String>,
}

impl Redactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, replacement: String) {
        self.values.insert(field.into(), replacement);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Returns the replacement for `field` as a value of type `V`, or `value` unchanged.
    ///
    /// Derived `apply_redactions` implementations call this once per protected field.
    pub fn apply<V: FieldValue>(&self, field: &str, value: V) -> V {
        match self.get(field) {
            Some(replacement) => V::from_redacted(replacement.to_owned()),
            None => value,
        }
    }
}

/// A record whose protected fields can be filtered.
///
/// Usually derived:
///
/// ```ignore
/// use field_visibility::{Guarded, Principal, RecordFilter, RuleSet};
///
/// #[derive(Clone, Guarded)]
/// #[visibility(owner = owner)]
/// struct Profile {
///     #[visibility(rules = visibility_email)]
///     email: String,
///     visibility_email: RuleSet,
///     nickname: String,
///     owner: Option<Principal>,
/// }
///
/// let profile = Profile {
///     email: "jo@example.com".into(),
///     visibility_email: RuleSet::new(),
///     nickname: "jo".into(),
///     owner: None,
/// };
/// let filtered = RecordFilter::new().filter(profile, &Principal::anonymous());
/// assert_eq!(filtered.email, "<Hidden>");
/// assert_eq!(filtered.nickname, "jo");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Guarded`",
    label = "this type cannot be filtered",
    note = "use `#[derive(Guarded)]` on the type definition, or wrap the data in a `Record`"
)]
pub trait Guarded: Sized {
    /// Every field name on the record, protected or not.
    fn field_names(&self) -> Vec<&str>;

    /// The protected fields, each with its rule set.
    fn guards(&self) -> Vec<FieldGuard<'_>>;

    /// A stable name for the record type, used in logs.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The record owner used by `share_*` rules.
    fn owner(&self) -> Option<&dyn AttributeSource> {
        None
    }

    /// Custom redaction hook. `None` falls back to the policy placeholder.
    fn hide(&self, _field: &str, _raw: &str) -> Option<String> {
        None
    }

    /// Rebuilds the record with the listed fields replaced. Unlisted fields are untouched.
    #[must_use]
    fn apply_redactions(self, redactions: &Redactions) -> Self;
}

/// A dynamic record: field values and rule sets keyed by name, bound to a [`Schema`].
///
/// Rule sets live in their own map, keyed by rule-set field name. A pairing
/// whose target or rule-set field is missing from the record is not enforced.
#[derive(Clone, Debug)]
pub struct Record<V = String> {
    schema: Arc<Schema>,
    fields: BTreeMap<String, V>,
    rule_sets: BTreeMap<String, RuleSet>,
    owner: Option<Principal>,
}

impl<V: FieldValue> Record<V> {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            fields: BTreeMap::new(),
            rule_sets: BTreeMap::new(),
            owner: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: V) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules_field: impl Into<String>, rules: RuleSet) -> Self {
        self.rule_sets.insert(rules_field.into(), rules);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Principal) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.fields.get(name)
    }

    pub fn rules(&self, rules_field: &str) -> Option<&RuleSet> {
        self.rule_sets.get(rules_field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_fields(self) -> BTreeMap<String, V> {
        self.fields
    }
}

impl<V: FieldValue> Guarded for Record<V> {
    fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .fields
            .keys()
            .chain(self.rule_sets.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn guards(&self) -> Vec<FieldGuard<'_>> {
        self.schema
            .pairings()
            .filter_map(|(target, rules_field)| {
                let value = self.fields.get(target)?;
                let rules = self.rule_sets.get(rules_field)?;
                Some(FieldGuard::new(
                    target,
                    rules_field,
                    Ok(Cow::Borrowed(rules)),
                    value,
                ))
            })
            .collect()
    }

    fn type_name(&self) -> &str {
        self.schema.name()
    }

    fn owner(&self) -> Option<&dyn AttributeSource> {
        self.owner
            .as_ref()
            .map(|owner| owner as &dyn AttributeSource)
    }

    fn hide(&self, field: &str, raw: &str) -> Option<String> {
        self.schema.hide_fn().and_then(|hook| hook(field, raw))
    }

    fn apply_redactions(mut self, redactions: &Redactions) -> Self {
        for (field, value) in &mut self.fields {
            if let Some(replacement) = redactions.get(field) {
                *value = V::from_redacted(replacement.to_owned());
            }
        }
        self
    }
}

/// Serializes the field values as a map. Rule sets and the owner are not serialized.
#[cfg(feature = "serde")]
impl<V: serde::Serialize> serde::Serialize for Record<V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Guarded, Record, Redactions};
    use crate::{RuleSet, Schema};

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder("profile")
                .protect("email", "visibility_email")
                .protect("phone", "visibility_phone")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn guards_skip_malformed_pairings() {
        let record: Record = Record::new(schema())
            .with_field("email", "a@example.com".to_owned())
            .with_rules("visibility_email", RuleSet::public())
            .with_rules("visibility_phone", RuleSet::public());
        let guards = record.guards();
        assert_eq!(guards.len(), 1);
        assert_eq!(guards[0].field(), "email");
        assert_eq!(guards[0].rules_field(), "visibility_email");
    }

    #[test]
    fn field_names_include_rule_fields() {
        let record: Record = Record::new(schema())
            .with_field("email", String::new())
            .with_field("nickname", String::new())
            .with_rules("visibility_email", RuleSet::new());
        assert_eq!(
            record.field_names(),
            vec!["email", "nickname", "visibility_email"]
        );
    }

    #[test]
    fn apply_redactions_replaces_only_listed_fields() {
        let record: Record = Record::new(schema())
            .with_field("email", "a@example.com".to_owned())
            .with_field("nickname", "al".to_owned());
        let mut redactions = Redactions::new();
        redactions.insert("email", "<Hidden>".to_owned());
        let record = record.apply_redactions(&redactions);
        assert_eq!(record.get("email").unwrap(), "<Hidden>");
        assert_eq!(record.get("nickname").unwrap(), "al");
    }

    #[test]
    fn redactions_apply_keeps_unlisted_values() {
        let redactions = Redactions::new();
        assert_eq!(redactions.apply("email", "kept".to_owned()), "kept");
    }
}
