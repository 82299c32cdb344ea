//! Member and type descriptors.
//!
//! A [`TypeDescriptor`] is the frozen, serialization-ready view of a type:
//! its category and its ordered [`MemberDescriptor`]s with every attribute
//! already applied. Descriptors are built once by a
//! [`TypeDescriptorFactory`] and shared through `Arc`.

// -----------------------------------------------------------------------------
// Modules

mod factory;
mod member;
mod mode;
mod type_descriptor;

// -----------------------------------------------------------------------------
// Exports

pub use factory::{DefaultTypeDescriptorFactory, MemberComparer, TypeDescriptorFactory};
pub use member::MemberDescriptor;
pub use mode::SerializeMode;
pub use type_descriptor::{DescriptorCategory, TypeDescriptor};
