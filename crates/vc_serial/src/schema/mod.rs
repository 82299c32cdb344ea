//! The built-in scalar vocabulary.
//!
//! A [`Schema`] owns the default tags (`!!int`, `!!str`, ...) and the
//! implicit resolution of untagged scalars. Its tags always outrank user
//! registrations in the tag registry.

// -----------------------------------------------------------------------------
// Modules

mod core_schema;

// -----------------------------------------------------------------------------
// Exports

pub use core_schema::CoreSchema;

use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::event::ScalarEvent;
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Schema

/// Owner of the default tags and of implicit scalar resolution.
pub trait Schema: Send + Sync {
    /// Converts a tag to its short form, e.g. `tag:yaml.org,2002:int` to `!!int`.
    fn shorten_tag<'a>(&self, tag: &'a str) -> Cow<'a, str>;

    /// Inverse of [`shorten_tag`](Self::shorten_tag).
    fn expand_tag<'a>(&self, tag: &'a str) -> Cow<'a, str>;

    /// The type a short default tag stands for.
    fn type_for_default_tag(&self, short_tag: &str) -> Option<&'static TypeInfo>;

    /// Whether `short_tag` belongs to the schema vocabulary.
    fn is_schema_tag(&self, short_tag: &str) -> bool;

    /// The default tag of a type, if the schema covers it.
    fn default_tag(&self, ty: TypeId) -> Option<&'static str>;

    /// Resolves a scalar against the schema.
    ///
    /// Untagged scalars go through implicit resolution, tagged ones must
    /// carry a schema tag. `None` if nothing matches. When `parse_value` is
    /// false only the tag is computed.
    fn try_parse(&self, scalar: &ScalarEvent, parse_value: bool) -> Option<ParsedScalar>;
}

// -----------------------------------------------------------------------------
// ParsedScalar

/// Result of [`Schema::try_parse`].
pub struct ParsedScalar {
    pub tag: &'static str,
    pub value: Option<Box<dyn Any>>,
}

impl fmt::Debug for ParsedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedScalar")
            .field("tag", &self.tag)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}
