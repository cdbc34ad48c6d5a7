//! Derive macro for `field-visibility`.
//!
//! This crate generates the `Guarded` implementation behind `#[derive(Guarded)]`. It:
//! - reads `#[visibility(...)]` container and field attributes
//! - resolves and validates field/rule-set pairings at compile time
//! - emits a `Guarded` implementation and a `Debug` impl that hides protected values
//!
//! It does **not** evaluate rules or apply redaction. Those live in the main
//! `field-visibility` crate and run at request time.

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
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_struct;
mod generics;
mod pairing;
mod strategy;
mod types;
use container::{parse_container_options, ContainerOptions};
use derive_struct::{derive_struct, StructDeriveOutput};
use generics::{add_debug_bounds, add_type_bounds};

/// Derives `field_visibility::Guarded` (and a value-hiding `Debug`) for structs.
///
/// # Container Attributes
///
/// Placed on the struct itself, in one or several `#[visibility(...)]` attributes:
///
/// - `owner = field` - The field holding the record owner, used by `share_*` rules. Its type must
///   implement `OwnerRef` (`Principal`, `Attributes`, `Option<Principal>`, ...).
/// - `hide = method` - A method `fn(&self, field: &str, raw: &str) -> Option<String>` called for
///   every hidden, non-blank value. Returning `None` falls back to the policy placeholder.
/// - `prefix = "visibility_"` - Pairs every field `x` with the field `<prefix>x` when both exist and
///   `x` has no explicit pairing.
/// - `skip_debug` - Opt out of `Debug` impl generation.
///
/// # Field Attributes
///
/// - **No annotation**: The field passes through unchanged (unless paired by `prefix`).
/// - `#[visibility(rules = field)]`: The field is guarded by the rule set stored in `field`. The
///   guarded type must implement `FieldValue`; the rule-set type must implement `AsRuleSet`.
///
/// Pairing mistakes are compile errors: a missing rule-set field, a field guarding itself, one
/// rule-set field shared by two fields, a protected rule-set field, or a scalar guarded field.
/// Enums, unions, tuple structs and unit structs are rejected.
///
/// # Additional Generated Impls
///
/// - `Debug`: when *not* building with `cfg(any(test, feature = "testing"))`, protected fields
///   are formatted as the string `"<Hidden>"` rather than their values.
#[proc_macro_derive(Guarded, attributes(visibility))]
pub fn derive_guarded(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the field-visibility crate root.
///
/// Handles crate renaming (e.g., `fv = { package = "field-visibility", ... }`)
/// and internal usage (when the derive is used inside field-visibility itself).
fn crate_root() -> TokenStream {
    match crate_name("field-visibility") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::field_visibility },
    }
}

fn crate_path(item: &str) -> TokenStream {
    let root = crate_root();
    let item = format_ident!("{}", item);
    quote! { #root::#item }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let options: ContainerOptions = parse_container_options(&attrs)?;
    let skip_debug = options.skip_debug;

    let fields = match data {
        Data::Struct(data) => data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "`Guarded` can only be derived for structs with named fields",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`Guarded` cannot be derived for unions",
            ));
        }
    };

    let StructDeriveOutput {
        guarded_body,
        guarded_predicates,
        debug_redacted_body,
        debug_redacted_generics,
        debug_unredacted_body,
        debug_unredacted_generics,
    } = derive_struct(&ident, fields, &generics, &options)?;

    let guarded = crate_path("Guarded");
    let guarded_generics = add_type_bounds(generics.clone(), guarded_predicates);
    let (impl_generics, ty_generics, where_clause) = guarded_generics.split_for_impl();

    let debug_redacted_generics = add_debug_bounds(generics.clone(), &debug_redacted_generics);
    let (debug_redacted_impl_generics, debug_redacted_ty_generics, debug_redacted_where_clause) =
        debug_redacted_generics.split_for_impl();
    let debug_unredacted_generics = add_debug_bounds(generics, &debug_unredacted_generics);
    let (
        debug_unredacted_impl_generics,
        debug_unredacted_ty_generics,
        debug_unredacted_where_clause,
    ) = debug_unredacted_generics.split_for_impl();

    let debug_impl = if skip_debug {
        quote! {}
    } else {
        quote! {
            #[cfg(any(test, feature = "testing"))]
            impl #debug_unredacted_impl_generics ::core::fmt::Debug for #ident #debug_unredacted_ty_generics #debug_unredacted_where_clause {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    #debug_unredacted_body
                }
            }

            #[cfg(not(any(test, feature = "testing")))]
            #[allow(unused_variables)]
            impl #debug_redacted_impl_generics ::core::fmt::Debug for #ident #debug_redacted_ty_generics #debug_redacted_where_clause {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    #debug_redacted_body
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #guarded for #ident #ty_generics #where_clause {
            #guarded_body
        }

        #debug_impl
    })
}
