//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericParam};

use crate::attributes::TypeAttributes;

/// What the derive needs to know about the input type.
pub(crate) struct TypeMeta<'a> {
    pub ast: &'a DeriveInput,
    pub attrs: TypeAttributes,
    pub vc_serial: syn::Path,
    /// Generics with a `Typed` bound on every type parameter.
    pub generics: syn::Generics,
}

impl<'a> TypeMeta<'a> {
    fn new(ast: &'a DeriveInput, attrs: TypeAttributes) -> syn::Result<Self> {
        let vc_serial = crate::path::vc_serial();
        let info_ = crate::path::info_(&vc_serial);

        let mut generics = ast.generics.clone();
        for param in &ast.generics.params {
            match param {
                GenericParam::Type(param) => {
                    let ident = &param.ident;
                    generics
                        .make_where_clause()
                        .predicates
                        .push(syn::parse_quote! { #ident: #info_::Typed });
                }
                GenericParam::Lifetime(param) => {
                    return Err(syn::Error::new_spanned(
                        param,
                        "`Typed` cannot be derived for types with lifetime parameters",
                    ));
                }
                GenericParam::Const(param) => {
                    return Err(syn::Error::new_spanned(
                        param,
                        "`Typed` cannot be derived for types with const parameters",
                    ));
                }
            }
        }

        Ok(Self {
            ast,
            attrs,
            vc_serial,
            generics,
        })
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.ast.generics.params.is_empty()
    }

    /// Type parameters in declaration order.
    pub fn type_params(&self) -> impl Iterator<Item = &syn::Ident> {
        self.ast.generics.type_params().map(|param| &param.ident)
    }
}

/// Expands `#[derive(Typed)]`.
pub(crate) fn derive_typed(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let meta = TypeMeta::new(ast, attrs)?;

    let kind = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => typed::object_kind(&meta, fields.named.iter())?,
            Fields::Unit => typed::object_kind(&meta, core::iter::empty())?,
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "`Typed` cannot be derived for tuple structs, name the fields",
                ));
            }
        },
        Data::Enum(data) => typed::enum_kind(&meta, data)?,
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "`Typed` cannot be derived for unions",
            ));
        }
    };

    let type_path_impl = type_path::impl_type_path(&meta);
    let typed_impl = typed::impl_typed(&meta, kind);
    let auto_register = auto_register::get_auto_register_impl(&meta);

    Ok(quote! {
        const _: () = {
            #type_path_impl
            #typed_impl
        };
        #auto_register
    })
}
