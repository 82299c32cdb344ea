//! Tags, type names and assemblies.
//!
//! The [`TagTypeRegistry`] maps tags to types and back, and resolves type
//! names such as `demo::Pair[i32,String][]` against the types of registered
//! [`Assembly`]s.

// -----------------------------------------------------------------------------
// Modules

mod assembly;
mod escape;
mod tag_registry;
mod type_name;

// -----------------------------------------------------------------------------
// Exports

pub use assembly::{Assembly, AssemblyRegistration, FactoryConstructor, TagTableEntry};
pub use escape::{escape_tag, unescape_tag};
pub use tag_registry::{MappedType, TagTypeRegistry};
pub use type_name::TypeName;

#[cfg(feature = "auto_register")]
pub use assembly::{AutoRegisterFactory, AutoRegisterType};
