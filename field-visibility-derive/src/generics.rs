//! Generic parameter handling for the generated impls.
//!
//! Bounds are added per field type, and only when that type mentions one of
//! the struct's type parameters. `PhantomData<T>` mentions nothing.

use syn::{parse_quote, Ident, Type, WherePredicate};

pub(crate) fn collect_generics_from_type(
    ty: &Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        Type::Path(path) => {
            let Some(segment) = path.path.segments.last() else {
                return;
            };
            if segment.ident == "PhantomData" {
                return;
            }
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }
            for param in generics.type_params() {
                if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                    result.push(param.ident.clone());
                }
            }
        }
        Type::Reference(reference) => collect_generics_from_type(&reference.elem, generics, result),
        Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        _ => {}
    }
}

pub(crate) fn mentions_generics(ty: &Type, generics: &syn::Generics) -> bool {
    let mut found = Vec::new();
    collect_generics_from_type(ty, generics, &mut found);
    !found.is_empty()
}

/// Appends `ty: bound` predicates to the where clause.
pub(crate) fn add_type_bounds(
    mut generics: syn::Generics,
    predicates: Vec<WherePredicate>,
) -> syn::Generics {
    if !predicates.is_empty() {
        generics.make_where_clause().predicates.extend(predicates);
    }
    generics
}

pub(crate) fn add_debug_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(::core::fmt::Debug));
        }
    }
    generics
}
