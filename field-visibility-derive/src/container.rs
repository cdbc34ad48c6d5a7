//! Container-level attribute parsing for `#[derive(Guarded)]`.
//!
//! This module handles attributes on the struct itself, not on fields.

use syn::{Attribute, Ident, LitStr, Meta, Result};

/// Options parsed from container-level `#[visibility(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// Field designating the record owner (`owner = field`).
    pub(crate) owner: Option<Ident>,
    /// Method used as the redaction hook (`hide = method`).
    pub(crate) hide: Option<Ident>,
    /// Naming convention pairing `x` with `<prefix>x` (`prefix = "visibility_"`).
    pub(crate) prefix: Option<LitStr>,
    /// If true, skip generating the `Debug` impl.
    pub(crate) skip_debug: bool,
}

fn set_once<T>(
    target: &mut Option<T>,
    value: T,
    meta: &syn::meta::ParseNestedMeta<'_>,
) -> Result<()> {
    if target.is_some() {
        return Err(meta.error(format!(
            "duplicate container option `{}`",
            meta.path
                .get_ident()
                .map_or_else(|| "?".to_string(), ToString::to_string)
        )));
    }
    *target = Some(value);
    Ok(())
}

/// Parses container-level `#[visibility(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("visibility") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                // Bare #[visibility] on container - currently no meaning, ignore
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip_debug") {
                        options.skip_debug = true;
                        Ok(())
                    } else if meta.path.is_ident("owner") {
                        let ident: Ident = meta.value()?.parse()?;
                        set_once(&mut options.owner, ident, &meta)
                    } else if meta.path.is_ident("hide") {
                        let ident: Ident = meta.value()?.parse()?;
                        set_once(&mut options.hide, ident, &meta)
                    } else if meta.path.is_ident("prefix") {
                        let prefix: LitStr = meta.value()?.parse()?;
                        if prefix.value().is_empty() {
                            return Err(meta.error("`prefix` must not be empty"));
                        }
                        set_once(&mut options.prefix, prefix, &meta)
                    } else {
                        Err(meta.error(format!(
                            "unknown container option `{}`; expected `owner`, `hide`, `prefix`, or `skip_debug`",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )))
                    }
                })?;
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[visibility]",
                ));
            }
        }
    }

    Ok(options)
}
