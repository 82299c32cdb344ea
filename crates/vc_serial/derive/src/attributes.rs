//! Parsing of `#[serial(...)]`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::ParseStream;
use syn::{Expr, Ident, LitStr, Path, Token};

static SERIAL_ATTRIBUTE_NAME: &str = "serial";

/// Runs `parse` on the content of every `#[serial(...)]` of `attrs`.
fn for_each_serial_attr(
    attrs: &[syn::Attribute],
    mut parse: impl FnMut(ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident(SERIAL_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_args_with(|input: ParseStream| {
            while !input.is_empty() {
                parse(input)?;
                if input.is_empty() {
                    break;
                }
                input.parse::<Token![,]>()?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn parse_value<T: syn::parse::Parse>(input: ParseStream) -> syn::Result<T> {
    input.parse::<Token![=]>()?;
    input.parse()
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// `#[serial(...)]` on a type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `type_path = "module::Name"`
    pub type_path: Option<LitStr>,
    /// `tag = "!name"`
    pub tags: Vec<LitStr>,
    /// `tag_alias = "!old_name"`
    pub tag_aliases: Vec<LitStr>,
    /// `style = Flow`
    pub style: Option<Ident>,
    /// `default`: use `Default` as constructor.
    pub default: Option<Span>,
    /// `auto_register`
    pub auto_register: Option<Span>,
    /// `compiler_generated`
    pub compiler_generated: Option<Span>,
    /// `@expr`
    pub custom: Vec<Expr>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_attr(attrs, |input| this.parse_one(input))?;
        Ok(this)
    }

    fn parse_one(&mut self, input: ParseStream) -> syn::Result<()> {
        if input.peek(Token![@]) {
            input.parse::<Token![@]>()?;
            self.custom.push(input.parse()?);
            return Ok(());
        }

        let key: Ident = input.parse()?;
        match key.to_string().as_str() {
            "type_path" => {
                let path: LitStr = parse_value(input)?;
                if path.value().starts_with("::") || path.value().is_empty() {
                    return Err(syn::Error::new(path.span(), "expected a path like `module::Name`"));
                }
                self.type_path = Some(path);
            }
            "tag" => self.tags.push(parse_value(input)?),
            "tag_alias" => self.tag_aliases.push(parse_value(input)?),
            "style" => self.style = Some(parse_value(input)?),
            "default" => self.default = Some(key.span()),
            "auto_register" => self.auto_register = Some(key.span()),
            "compiler_generated" => self.compiler_generated = Some(key.span()),
            _ => return Err(syn::Error::new(key.span(), format!("unknown type attribute `{key}`"))),
        }
        Ok(())
    }

    /// The `Attribute` list of the type.
    pub fn attribute_list(&self, vc_serial: &Path) -> TokenStream {
        let attribute_ = crate::path::attribute_(vc_serial);
        let exports_ = crate::path::macro_exports_(vc_serial);

        let tags = self
            .tags
            .iter()
            .map(|tag| quote! { #attribute_::Tag(#exports_::Cow::Borrowed(#tag)) });
        let aliases = self
            .tag_aliases
            .iter()
            .map(|tag| quote! { #attribute_::TagAlias(#exports_::Cow::Borrowed(#tag)) });
        let style = self
            .style
            .iter()
            .map(|style| quote! { #attribute_::Style(#vc_serial::event::DataStyle::#style) });
        let custom = self.custom.iter().map(|expr| quote! { #attribute_::custom(#expr) });

        quote! {
            #exports_::Vec::from([#(#tags,)* #(#aliases,)* #(#style,)* #(#custom,)*])
        }
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// `#[serial(...)]` on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub aliases: Vec<LitStr>,
    pub order: Option<Expr>,
    pub mode: Option<Ident>,
    pub mask: Option<Expr>,
    pub style: Option<Ident>,
    pub tag: Option<LitStr>,
    /// `should_serialize = path`, a `fn(&FieldType) -> bool`.
    pub should_serialize: Option<Path>,
    pub skip: bool,
    /// No setter is generated, the field is filled in place.
    pub readonly: bool,
    /// The field embeds the base of the type.
    pub base: bool,
    pub custom: Vec<Expr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_attr(attrs, |input| this.parse_one(input))?;
        Ok(this)
    }

    fn parse_one(&mut self, input: ParseStream) -> syn::Result<()> {
        if input.peek(Token![@]) {
            input.parse::<Token![@]>()?;
            self.custom.push(input.parse()?);
            return Ok(());
        }

        let key: Ident = input.parse()?;
        match key.to_string().as_str() {
            "rename" => self.rename = Some(parse_value(input)?),
            "alias" => self.aliases.push(parse_value(input)?),
            "order" => self.order = Some(parse_value(input)?),
            "mode" => self.mode = Some(parse_value(input)?),
            "mask" => self.mask = Some(parse_value(input)?),
            "style" => self.style = Some(parse_value(input)?),
            "tag" => self.tag = Some(parse_value(input)?),
            "should_serialize" => self.should_serialize = Some(parse_value(input)?),
            "skip" => self.skip = true,
            "readonly" => self.readonly = true,
            "base" => self.base = true,
            _ => return Err(syn::Error::new(key.span(), format!("unknown field attribute `{key}`"))),
        }
        Ok(())
    }

    /// The `Attribute` list of a field of type `field_ty`.
    pub fn attribute_list(&self, vc_serial: &Path, field_ty: &syn::Type) -> TokenStream {
        let attribute_ = crate::path::attribute_(vc_serial);
        let exports_ = crate::path::macro_exports_(vc_serial);

        let mut list = Vec::new();
        if let Some(rename) = &self.rename {
            list.push(quote! { #attribute_::Rename(#exports_::Cow::Borrowed(#rename)) });
        }
        for alias in &self.aliases {
            list.push(quote! { #attribute_::Alias(#exports_::Cow::Borrowed(#alias)) });
        }
        if let Some(order) = &self.order {
            list.push(quote! { #attribute_::Order(#order) });
        }
        if let Some(mode) = &self.mode {
            list.push(quote! { #attribute_::Mode(#vc_serial::descriptor::SerializeMode::#mode) });
        }
        if let Some(mask) = &self.mask {
            list.push(quote! { #attribute_::Mask(#mask) });
        }
        if let Some(style) = &self.style {
            list.push(quote! { #attribute_::Style(#vc_serial::event::DataStyle::#style) });
        }
        if let Some(tag) = &self.tag {
            list.push(quote! { #attribute_::Tag(#exports_::Cow::Borrowed(#tag)) });
        }
        if let Some(predicate) = &self.should_serialize {
            list.push(quote! {
                #attribute_::ShouldSerialize(|value: &dyn #exports_::Any| {
                    match value.downcast_ref::<#field_ty>() {
                        ::core::option::Option::Some(value) => #predicate(value),
                        ::core::option::Option::None => true,
                    }
                })
            });
        }
        if self.skip {
            list.push(quote! { #attribute_::Ignore });
        }
        for expr in &self.custom {
            list.push(quote! { #attribute_::custom(#expr) });
        }

        quote! { #exports_::Vec::from([#(#list),*]) }
    }
}

// -----------------------------------------------------------------------------
// VariantAttributes

/// `#[serial(...)]` on a unit enum variant.
#[derive(Default)]
pub(crate) struct VariantAttributes {
    pub rename: Option<LitStr>,
    pub aliases: Vec<LitStr>,
}

impl VariantAttributes {
    pub fn parse_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_attr(attrs, |input| {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "rename" => this.rename = Some(parse_value(input)?),
                "alias" => this.aliases.push(parse_value(input)?),
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown variant attribute `{key}`"),
                    ));
                }
            }
            Ok(())
        })?;
        Ok(this)
    }
}
