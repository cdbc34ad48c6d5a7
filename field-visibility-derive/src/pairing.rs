//! Resolution and validation of field/rule-set pairings.
//!
//! Pairings come from `#[visibility(rules = f)]` on a field, or from the
//! container's `prefix` convention for fields without an explicit pairing.
//! Every pairing mistake is a compile error here, so a misspelled rule-set
//! field never leaves a value unguarded at runtime.

use std::collections::BTreeMap;

use syn::{ext::IdentExt, Ident, LitStr, Result, Type};

use crate::{strategy::Strategy, types::is_scalar_type};

/// One named field of the struct being derived.
pub(crate) struct FieldInfo {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) strategy: Strategy,
}

impl FieldInfo {
    /// The field name as it appears at runtime (`r#type` is `type`).
    pub(crate) fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

/// A protected field and the field holding its rule set.
pub(crate) struct Pairing<'a> {
    pub(crate) target: &'a FieldInfo,
    pub(crate) rules: &'a FieldInfo,
}

fn find<'a>(fields: &'a [FieldInfo], name: &str) -> Option<&'a FieldInfo> {
    fields.iter().find(|field| field.name() == name)
}

pub(crate) fn resolve_pairings<'a>(
    fields: &'a [FieldInfo],
    prefix: Option<&LitStr>,
) -> Result<Vec<Pairing<'a>>> {
    let mut pairings = Vec::new();

    for field in fields {
        if let Strategy::Protect(rules) = &field.strategy {
            let rules_name = rules.unraw().to_string();
            let Some(rules_field) = find(fields, &rules_name) else {
                return Err(syn::Error::new(
                    rules.span(),
                    format!("no field named `{rules_name}` holds the rule set for `{}`", field.name()),
                ));
            };
            pairings.push(Pairing {
                target: field,
                rules: rules_field,
            });
        }
    }

    if let Some(prefix) = prefix {
        let prefix_value = prefix.value();
        for field in fields {
            let name = field.name();
            if name.starts_with(&prefix_value) || matches!(field.strategy, Strategy::Protect(_)) {
                continue;
            }
            if let Some(rules_field) = find(fields, &format!("{prefix_value}{name}")) {
                pairings.push(Pairing {
                    target: field,
                    rules: rules_field,
                });
            }
        }
    }

    validate(&pairings)?;
    Ok(pairings)
}

fn validate(pairings: &[Pairing<'_>]) -> Result<()> {
    let mut rule_fields: BTreeMap<String, String> = BTreeMap::new();
    for pairing in pairings {
        let target = pairing.target.name();
        let rules = pairing.rules.name();
        if target == rules {
            return Err(syn::Error::new(
                pairing.target.ident.span(),
                format!("field `{target}` cannot guard itself"),
            ));
        }
        if is_scalar_type(&pairing.target.ty) {
            return Err(syn::Error::new_spanned(
                &pairing.target.ty,
                format!(
                    "field `{target}` has a scalar type; protected fields hold string-like values \
                     such as `String` or `Option<String>`"
                ),
            ));
        }
        if let Some(previous) = rule_fields.insert(rules.clone(), target.clone()) {
            return Err(syn::Error::new(
                pairing.rules.ident.span(),
                format!("rule-set field `{rules}` already guards `{previous}` and cannot also guard `{target}`"),
            ));
        }
    }
    for pairing in pairings {
        let target = pairing.target.name();
        if rule_fields.contains_key(&target) {
            return Err(syn::Error::new(
                pairing.target.ident.span(),
                format!("rule-set field `{target}` cannot itself be protected"),
            ));
        }
    }
    Ok(())
}
