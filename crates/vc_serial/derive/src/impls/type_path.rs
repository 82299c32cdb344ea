use proc_macro2::TokenStream;
use quote::quote;

use crate::impls::TypeMeta;

/// `(module, name)` of the type, `module` is an expression of type
/// `Option<&'static str>`.
fn module_and_name(meta: &TypeMeta) -> (TokenStream, String) {
    match &meta.attrs.type_path {
        Some(custom) => {
            let custom = custom.value();
            match custom.rsplit_once("::") {
                Some((module, name)) => (
                    quote! { ::core::option::Option::Some(#module) },
                    name.to_owned(),
                ),
                None => (quote! { ::core::option::Option::None }, custom),
            }
        }
        None => (
            quote! { ::core::option::Option::Some(::core::module_path!()) },
            meta.ast.ident.to_string(),
        ),
    }
}

/// The path without generic arguments, an expression of type `&'static str`.
pub(crate) fn definition_path(meta: &TypeMeta) -> TokenStream {
    match &meta.attrs.type_path {
        Some(custom) => quote! { #custom },
        None => {
            let name = format!("::{}", meta.ast.ident);
            quote! { ::core::concat!(::core::module_path!(), #name) }
        }
    }
}

pub(crate) fn impl_type_path(meta: &TypeMeta) -> TokenStream {
    let info_ = crate::path::info_(&meta.vc_serial);
    let ident = &meta.ast.ident;
    let (impl_generics, ty_generics, where_clause) = meta.generics.split_for_impl();

    let (module, name) = module_and_name(meta);
    let definition = definition_path(meta);

    let (type_path, type_name) = if meta.is_generic() {
        let params: Vec<_> = meta.type_params().collect();
        let args = |method: TokenStream| {
            let parts = params.iter().enumerate().map(|(index, param)| {
                let separator = if index == 0 { "[" } else { "," };
                quote! { #separator, <#param as #info_::TypePath>::#method() }
            });
            quote! { #(#parts,)* "]" }
        };
        let path_args = args(quote! { type_path });
        let name_args = args(quote! { type_name });
        (
            quote! {
                static CELL: #info_::GenericTypePathCell = #info_::GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| #info_::concat(&[#definition, #path_args]))
            },
            quote! {
                static CELL: #info_::GenericTypePathCell = #info_::GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| #info_::concat(&[#name, #name_args]))
            },
        )
    } else {
        (quote! { #definition }, quote! { #name })
    };

    quote! {
        impl #impl_generics #info_::TypePath for #ident #ty_generics #where_clause {
            fn type_path() -> &'static str {
                #type_path
            }

            fn type_name() -> &'static str {
                #type_name
            }

            fn type_ident() -> &'static str {
                #name
            }

            fn module_path() -> ::core::option::Option<&'static str> {
                #module
            }
        }
    }
}
