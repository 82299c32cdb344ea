//! Metadata attached to types and members.
//!
//! Attributes come from two places: the ones declared with
//! `#[serial(...)]` (stored in [`TypeInfo`](crate::info::TypeInfo) and
//! [`FieldInfo`](crate::info::FieldInfo)), and the ones registered at run
//! time on an [`AttributeRegistry`]. The registry merges both.

// -----------------------------------------------------------------------------
// Modules

mod attribute;
mod registry;

// -----------------------------------------------------------------------------
// Exports

pub use attribute::Attribute;
pub use registry::{AttributeRegistry, AttributeRemap, AttributeTarget, PrepareMembersCallback};
