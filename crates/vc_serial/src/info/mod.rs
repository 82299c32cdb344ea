//! Static type information.
//!
//! Every type taking part in a read or write pass implements [`Typed`],
//! exposing a `'static` [`TypeInfo`]: its names, its [`TypeKind`] with
//! type-erased accessors, its declared attributes and an optional
//! constructor. The engine never inspects a value through anything else.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod container_info;
mod field_info;
mod scalar_info;
mod type_info;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypeCell, GenericTypeInfoCell, GenericTypePathCell};
pub use cell::{NonGenericTypeCell, NonGenericTypeInfoCell, concat};

pub use container_info::{CollectionInfo, CollectionOps};
pub use container_info::{DictionaryInfo, DictionaryOps};
pub use container_info::{DynamicInfo, NullableInfo};
pub use field_info::{FieldAccess, FieldFlags, FieldGetter, FieldGetterMut, FieldInfo, FieldSetter};
pub use field_info::ObjectInfo;
pub use scalar_info::{BinaryLayout, ScalarInfo, ScalarParseError};
pub use type_info::{GenericInfo, TypeInfo, TypeKind};
pub use type_path::{Type, TypePath, TypePathTable};
pub use typed::Typed;
