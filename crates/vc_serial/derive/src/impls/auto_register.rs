use proc_macro2::TokenStream;

use crate::impls::TypeMeta;

/// Submits the type for `Assembly::collect`. Generic types are skipped, the
/// instantiations to register are unknown.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(meta: &TypeMeta) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = meta.attrs.auto_register else {
        return TokenStream::new();
    };
    if meta.is_generic() {
        return TokenStream::new();
    }

    let vc_serial = &meta.vc_serial;
    let exports_ = crate::path::macro_exports_(vc_serial);
    let info_ = crate::path::info_(vc_serial);
    let ident = &meta.ast.ident;

    quote_spanned! { span =>
        #exports_::inventory::submit! {
            #vc_serial::registry::AutoRegisterType {
                crate_name: ::core::env!("CARGO_PKG_NAME"),
                type_info: <#ident as #info_::Typed>::type_info,
            }
        }
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &TypeMeta) -> TokenStream {
    TokenStream::new()
}
