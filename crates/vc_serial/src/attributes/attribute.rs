use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::descriptor::SerializeMode;
use crate::event::DataStyle;

// -----------------------------------------------------------------------------
// Attribute

/// One piece of serialization metadata.
///
/// When an attribute list holds several attributes of a single-valued kind
/// (`Rename`, `Order`, ...), the last one wins. Inherited attributes come
/// first, so a derived declaration overrides its base.
#[derive(Clone)]
pub enum Attribute {
    /// Serialized name of a member.
    Rename(Cow<'static, str>),
    /// Additional name accepted when reading a member.
    Alias(Cow<'static, str>),
    /// Explicit position among the members of a type.
    Order(i32),
    Mode(SerializeMode),
    /// Member mask, see [`SerializerOptions::member_mask`].
    ///
    /// [`SerializerOptions::member_mask`]: crate::settings::SerializerOptions::member_mask
    Mask(u32),
    Style(DataStyle),
    /// Removes a member from its type descriptor.
    Ignore,
    /// Canonical tag of a type.
    Tag(Cow<'static, str>),
    /// Additional tag resolving to a type.
    TagAlias(Cow<'static, str>),
    /// Returns `false` for member values that should not be written.
    ShouldSerialize(fn(&dyn Any) -> bool),
    /// Host-defined metadata.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Attribute {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// The value of a [`Custom`](Self::Custom) attribute of type `T`.
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(value) => (**value).downcast_ref(),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rename(_) => "Rename",
            Self::Alias(_) => "Alias",
            Self::Order(_) => "Order",
            Self::Mode(_) => "Mode",
            Self::Mask(_) => "Mask",
            Self::Style(_) => "Style",
            Self::Ignore => "Ignore",
            Self::Tag(_) => "Tag",
            Self::TagAlias(_) => "TagAlias",
            Self::ShouldSerialize(_) => "ShouldSerialize",
            Self::Custom(_) => "Custom",
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(name) => f.debug_tuple("Rename").field(name).finish(),
            Self::Alias(name) => f.debug_tuple("Alias").field(name).finish(),
            Self::Order(order) => f.debug_tuple("Order").field(order).finish(),
            Self::Mode(mode) => f.debug_tuple("Mode").field(mode).finish(),
            Self::Mask(mask) => f.debug_tuple("Mask").field(mask).finish(),
            Self::Style(style) => f.debug_tuple("Style").field(style).finish(),
            Self::Ignore => f.write_str("Ignore"),
            Self::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Self::TagAlias(tag) => f.debug_tuple("TagAlias").field(tag).finish(),
            Self::ShouldSerialize(_) | Self::Custom(_) => {
                f.debug_tuple(self.kind_name()).finish_non_exhaustive()
            }
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rename(a), Self::Rename(b))
            | (Self::Alias(a), Self::Alias(b))
            | (Self::Tag(a), Self::Tag(b))
            | (Self::TagAlias(a), Self::TagAlias(b)) => a == b,
            (Self::Order(a), Self::Order(b)) => a == b,
            (Self::Mode(a), Self::Mode(b)) => a == b,
            (Self::Mask(a), Self::Mask(b)) => a == b,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Ignore, Self::Ignore) => true,
            (Self::ShouldSerialize(a), Self::ShouldSerialize(b)) => core::ptr::fn_addr_eq(*a, *b),
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Attribute;

    #[derive(Debug, PartialEq)]
    struct Category(&'static str);

    #[test]
    fn custom_downcast() {
        let attr = Attribute::custom(Category("editor"));
        assert_eq!(attr.downcast_custom::<Category>(), Some(&Category("editor")));
        assert_eq!(attr.downcast_custom::<u32>(), None);
        assert_eq!(Attribute::Ignore.downcast_custom::<Category>(), None);
    }

    #[test]
    fn equality() {
        assert_eq!(Attribute::Rename("a".into()), Attribute::Rename("a".into()));
        assert_ne!(Attribute::Rename("a".into()), Attribute::Alias("a".into()));

        let shared = Attribute::custom(1_u8);
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, Attribute::custom(1_u8));
    }
}
