//! Paths used by the generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// The path of `vc_serial` as seen from the crate being expanded.
///
/// Reading the manifest is not free, so the path is computed once per
/// derive and passed around.
pub(crate) fn vc_serial() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_serial"))
}

#[inline(always)]
pub(crate) fn macro_exports_(vc_serial: &syn::Path) -> TokenStream {
    quote! { #vc_serial::__macro_exports }
}

#[inline(always)]
pub(crate) fn info_(vc_serial: &syn::Path) -> TokenStream {
    quote! { #vc_serial::info }
}

#[inline(always)]
pub(crate) fn attribute_(vc_serial: &syn::Path) -> TokenStream {
    quote! { #vc_serial::attributes::Attribute }
}
