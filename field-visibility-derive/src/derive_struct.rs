//! `Guarded` derivation for structs with named fields.
//!
//! Generates the field listing, one `FieldGuard` per pairing, the owner and
//! hook accessors, `apply_redactions`, and the parts of the `Debug` impl.

use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};
use syn::{parse_quote, spanned::Spanned, Fields, Result, WherePredicate};

use crate::{
    container::ContainerOptions,
    crate_path,
    generics::{collect_generics_from_type, mentions_generics},
    pairing::{resolve_pairings, FieldInfo},
    strategy::parse_field_strategy,
};

pub(crate) struct StructDeriveOutput {
    pub(crate) guarded_body: TokenStream,
    pub(crate) guarded_predicates: Vec<WherePredicate>,
    pub(crate) debug_redacted_body: TokenStream,
    pub(crate) debug_redacted_generics: Vec<Ident>,
    pub(crate) debug_unredacted_body: TokenStream,
    pub(crate) debug_unredacted_generics: Vec<Ident>,
}

#[allow(clippy::too_many_lines)]
pub(crate) fn derive_struct(
    name: &Ident,
    fields: Fields,
    generics: &syn::Generics,
    options: &ContainerOptions,
) -> Result<StructDeriveOutput> {
    let fields = match fields {
        Fields::Named(fields) => fields,
        Fields::Unnamed(fields) => {
            return Err(syn::Error::new(
                fields.span(),
                "`Guarded` requires named fields; pairings are declared by field name",
            ));
        }
        Fields::Unit => {
            return Err(syn::Error::new(
                name.span(),
                "`Guarded` cannot be derived for unit structs",
            ));
        }
    };

    let infos = fields
        .named
        .into_iter()
        .map(|field| {
            let strategy = parse_field_strategy(&field.attrs)?;
            let ident = field
                .ident
                .ok_or_else(|| syn::Error::new(field.ty.span(), "expected a named field"))?;
            Ok(FieldInfo {
                ident,
                ty: field.ty,
                strategy,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let pairings = resolve_pairings(&infos, options.prefix.as_ref())?;

    let field_value = crate_path("FieldValue");
    let as_rule_set = crate_path("AsRuleSet");
    let field_guard = crate_path("FieldGuard");
    let redactions_path = crate_path("Redactions");
    let attribute_source = crate_path("AttributeSource");
    let owner_ref = crate_path("OwnerRef");

    let mut guarded_predicates: Vec<WherePredicate> = Vec::new();
    let mut guards = Vec::new();
    let mut redacted_fields = Vec::new();
    for pairing in &pairings {
        let target = &pairing.target.ident;
        let target_ty = &pairing.target.ty;
        let target_name = pairing.target.name();
        let rules = &pairing.rules.ident;
        let rules_ty = &pairing.rules.ty;
        let rules_name = pairing.rules.name();

        if mentions_generics(target_ty, generics) {
            guarded_predicates.push(parse_quote!(#target_ty: #field_value));
        }
        if mentions_generics(rules_ty, generics) {
            guarded_predicates.push(parse_quote!(#rules_ty: #as_rule_set));
        }

        let span = target.span();
        guards.push(quote_spanned! { span =>
            #field_guard::new(
                #target_name,
                #rules_name,
                #as_rule_set::as_rule_set(&self.#rules, #rules_name),
                &self.#target,
            )
        });
        redacted_fields.push(quote_spanned! { span =>
            #target: redactions.apply(#target_name, self.#target)
        });
    }

    let owner_fn = match &options.owner {
        Some(owner) => {
            let Some(owner_field) = infos.iter().find(|field| field.ident == *owner) else {
                return Err(syn::Error::new(
                    owner.span(),
                    format!("no field named `{owner}` to use as the record owner"),
                ));
            };
            let owner_ty = &owner_field.ty;
            if mentions_generics(owner_ty, generics) {
                guarded_predicates.push(parse_quote!(#owner_ty: #owner_ref));
            }
            quote! {
                fn owner(&self) -> ::core::option::Option<&dyn #attribute_source> {
                    #owner_ref::owner_ref(&self.#owner)
                }
            }
        }
        None => quote! {},
    };

    let hide_fn = match &options.hide {
        Some(hide) => quote! {
            fn hide(
                &self,
                field: &str,
                raw: &str,
            ) -> ::core::option::Option<::std::string::String> {
                Self::#hide(self, field, raw)
            }
        },
        None => quote! {},
    };

    let field_names: Vec<String> = infos.iter().map(FieldInfo::name).collect();
    let guarded_body = quote! {
        fn field_names(&self) -> ::std::vec::Vec<&str> {
            ::std::vec![#(#field_names),*]
        }

        fn guards(&self) -> ::std::vec::Vec<#field_guard<'_>> {
            ::std::vec![#(#guards),*]
        }

        fn type_name(&self) -> &str {
            stringify!(#name)
        }

        #owner_fn

        #hide_fn

        #[allow(clippy::needless_update, unused_variables)]
        fn apply_redactions(self, redactions: &#redactions_path) -> Self {
            Self {
                #(#redacted_fields,)*
                ..self
            }
        }
    };

    let mut debug_redacted_fields = Vec::new();
    let mut debug_unredacted_fields = Vec::new();
    let mut debug_redacted_generics = Vec::new();
    let mut debug_unredacted_generics = Vec::new();
    let mut bindings = Vec::new();
    for info in &infos {
        let ident = &info.ident;
        let label = info.name();
        let span = ident.span();
        let protected = pairings
            .iter()
            .any(|pairing| pairing.target.ident == *ident);

        collect_generics_from_type(&info.ty, generics, &mut debug_unredacted_generics);
        if protected {
            debug_redacted_fields.push(quote_spanned! { span =>
                debug.field(#label, &"<Hidden>");
            });
        } else {
            collect_generics_from_type(&info.ty, generics, &mut debug_redacted_generics);
            debug_redacted_fields.push(quote_spanned! { span =>
                debug.field(#label, #ident);
            });
        }
        debug_unredacted_fields.push(quote_spanned! { span =>
            debug.field(#label, #ident);
        });
        bindings.push(ident);
    }

    Ok(StructDeriveOutput {
        guarded_body,
        guarded_predicates,
        debug_redacted_body: quote! {
            match self {
                Self { #(#bindings),* } => {
                    let mut debug = f.debug_struct(stringify!(#name));
                    #(#debug_redacted_fields)*
                    debug.finish()
                }
            }
        },
        debug_redacted_generics,
        debug_unredacted_body: quote! {
            match self {
                Self { #(#bindings),* } => {
                    let mut debug = f.debug_struct(stringify!(#name));
                    #(#debug_unredacted_fields)*
                    debug.finish()
                }
            }
        },
        debug_unredacted_generics,
    })
}
