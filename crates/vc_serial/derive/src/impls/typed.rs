use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, Fields, LitStr, Visibility};

use crate::attributes::{FieldAttributes, VariantAttributes};
use crate::impls::TypeMeta;

/// `TypeKind::Object` with one `FieldInfo` per field.
pub(crate) fn object_kind<'f>(
    meta: &TypeMeta,
    fields: impl Iterator<Item = &'f syn::Field>,
) -> syn::Result<TokenStream> {
    let vc_serial = &meta.vc_serial;
    let info_ = crate::path::info_(vc_serial);
    let exports_ = crate::path::macro_exports_(vc_serial);

    let mut field_infos = Vec::new();
    for (index, field) in fields.enumerate() {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        let Some(member) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let ty = &field.ty;
        let name = member.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);

        let set = if attrs.readonly {
            quote! { ::core::option::Option::None }
        } else {
            quote! {
                ::core::option::Option::Some(|owner, value| {
                    match (owner.downcast_mut::<Self>(), value.downcast::<#ty>()) {
                        (::core::option::Option::Some(owner), ::core::result::Result::Ok(value)) => {
                            owner.#member = *value;
                            true
                        }
                        _ => false,
                    }
                })
            }
        };

        let mut flags = Vec::new();
        if matches!(field.vis, Visibility::Public(_)) {
            flags.push(quote! { #info_::FieldFlags::PUBLIC });
        }
        if attrs.base {
            flags.push(quote! { #info_::FieldFlags::BASE });
        }
        let flags = if flags.is_empty() {
            quote! { #info_::FieldFlags::empty() }
        } else {
            quote! { #(#flags)|* }
        };

        let attribute_list = attrs.attribute_list(vc_serial, ty);
        field_infos.push(quote! {
            #info_::FieldInfo::new::<#ty>(#name, #index, #info_::FieldAccess {
                get: |owner| match owner.downcast_ref::<Self>() {
                    ::core::option::Option::Some(owner) => {
                        ::core::option::Option::Some(&owner.#member as &dyn #exports_::Any)
                    }
                    ::core::option::Option::None => ::core::option::Option::None,
                },
                get_mut: |owner| match owner.downcast_mut::<Self>() {
                    ::core::option::Option::Some(owner) => {
                        ::core::option::Option::Some(&mut owner.#member as &mut dyn #exports_::Any)
                    }
                    ::core::option::Option::None => ::core::option::Option::None,
                },
                set: #set,
            })
            .with_attributes(#attribute_list)
            .with_flags(#flags)
        });
    }

    Ok(quote! {
        #info_::TypeKind::Object(#info_::ObjectInfo::new(#exports_::Vec::from([#(#field_infos),*])))
    })
}

/// `TypeKind::Scalar` holding the variant name.
pub(crate) fn enum_kind(meta: &TypeMeta, data: &DataEnum) -> syn::Result<TokenStream> {
    let vc_serial = &meta.vc_serial;
    let info_ = crate::path::info_(vc_serial);
    let exports_ = crate::path::macro_exports_(vc_serial);

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            data.enum_token,
            "`Typed` cannot be derived for enums without variants",
        ));
    }

    let mut format_arms = Vec::new();
    let mut parse_arms = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`Typed` can only be derived for enums with unit variants",
            ));
        }
        let attrs = VariantAttributes::parse_attrs(&variant.attrs)?;
        let ident = &variant.ident;
        let name = attrs
            .rename
            .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));
        let aliases = &attrs.aliases;

        format_arms.push(quote! { Self::#ident => #name });
        parse_arms.push(quote! {
            #name #(| #aliases)* => ::core::result::Result::Ok(
                #exports_::Box::new(Self::#ident) as #exports_::Box<dyn #exports_::Any>
            )
        });
    }

    let ident_str = meta.ast.ident.to_string();
    Ok(quote! {
        #info_::TypeKind::Scalar(#info_::ScalarInfo::new(
            |value| match value.downcast_ref::<Self>() {
                ::core::option::Option::Some(value) => ::core::option::Option::Some(
                    #exports_::String::from(match value { #(#format_arms,)* })
                ),
                ::core::option::Option::None => ::core::option::Option::None,
            },
            |text| match text.trim() {
                #(#parse_arms,)*
                other => ::core::result::Result::Err(#info_::ScalarParseError(#exports_::format!(
                    "`{}` is not a variant of `{}`",
                    other,
                    #ident_str,
                ))),
            },
        ))
    })
}

pub(crate) fn impl_typed(meta: &TypeMeta, kind: TokenStream) -> TokenStream {
    let vc_serial = &meta.vc_serial;
    let info_ = crate::path::info_(vc_serial);
    let exports_ = crate::path::macro_exports_(vc_serial);
    let ident = &meta.ast.ident;
    let (impl_generics, ty_generics, where_clause) = meta.generics.split_for_impl();

    let attribute_list = meta.attrs.attribute_list(vc_serial);
    let default = meta
        .attrs
        .default
        .map(|_| quote! { .with_default::<Self>() });
    let compiler_generated = meta
        .attrs
        .compiler_generated
        .map(|_| quote! { .with_compiler_generated(true) });

    let build = quote! {
        #info_::TypeInfo::new::<Self>(#kind)
            .with_attributes(#attribute_list)
            #default
            #compiler_generated
    };

    let body = if meta.is_generic() {
        let definition = crate::impls::type_path::definition_path(meta);
        let ident_str = ident.to_string();
        let params = meta.type_params();
        quote! {
            static CELL: #info_::GenericTypeInfoCell = #info_::GenericTypeInfoCell::new();
            CELL.get_or_insert::<Self>(|| {
                #build.with_generic(#info_::GenericInfo::new(
                    #definition,
                    #ident_str,
                    #exports_::Vec::from([#(#info_::Type::of::<#params>()),*]),
                ))
            })
        }
    } else {
        quote! {
            static CELL: #info_::NonGenericTypeInfoCell = #info_::NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| #build)
        }
    };

    quote! {
        impl #impl_generics #info_::Typed for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #info_::TypeInfo {
                #body
            }
        }
    }
}
