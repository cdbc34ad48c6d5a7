//! Parsing of `#[visibility(...)]` field attributes.
//!
//! This module maps attribute syntax to pairing decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, Ident, Meta, Result};

/// Field handling based on `#[visibility(...)]` attributes.
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None | `PassThrough` | Field is never touched (unless paired by `prefix`) |
/// | `#[visibility(rules = f)]` | `Protect(f)` | Field is guarded by rule-set field `f` |
#[derive(Clone, Debug)]
pub(crate) enum Strategy {
    /// No annotation: the field passes through unchanged.
    PassThrough,
    /// `#[visibility(rules = field)]`: the field is guarded by `field`.
    Protect(Ident),
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "multiple #[visibility] attributes specified on the same field",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_strategy(attrs: &[Attribute]) -> Result<Strategy> {
    let mut strategy: Option<Strategy> = None;
    for attr in attrs {
        if !attr.path().is_ident("visibility") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected a rule-set field (e.g., #[visibility(rules = visibility_email)])",
                ));
            }
            Meta::List(list) => {
                let mut rules: Option<Ident> = None;
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rules") {
                        if rules.is_some() {
                            return Err(meta.error("`rules` specified more than once"));
                        }
                        rules = Some(meta.value()?.parse()?);
                        Ok(())
                    } else {
                        Err(meta.error("unknown field option; expected `rules = <field>`"))
                    }
                })?;
                let Some(rules) = rules else {
                    return Err(syn::Error::new(
                        attr.span(),
                        "expected a rule-set field (e.g., #[visibility(rules = visibility_email)])",
                    ));
                };
                set_strategy(&mut strategy, Strategy::Protect(rules), attr.span())?;
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[visibility]",
                ));
            }
        }
    }

    // Default: no annotation means pass through unchanged
    Ok(strategy.unwrap_or(Strategy::PassThrough))
}
