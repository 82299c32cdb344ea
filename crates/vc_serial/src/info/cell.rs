//! Static storage for [`TypeInfo`] and generated type paths.
//!
//! - [`NonGenericTypeInfoCell`]: a `OnceLock`, for non-generic types.
//! - [`GenericTypeInfoCell`] / [`GenericTypePathCell`]: a `static` inside a
//!   generic function is shared by every instantiation, so these cells key
//!   their content by [`TypeId`] and leak one value per instantiation.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::info::TypeInfo;

mod sealed {
    use super::TypeInfo;
    use alloc::string::String;

    pub trait CellContent: Send + Sync + 'static {}

    impl CellContent for String {}
    impl CellContent for TypeInfo {}
}

use sealed::CellContent;

// -----------------------------------------------------------------------------
// NonGenericTypeInfoCell

/// Lazily initialized storage of one value.
pub struct NonGenericTypeCell<T: CellContent>(OnceLock<T>);

/// Storage of the [`TypeInfo`] of a non-generic type.
///
/// ```
/// use vc_serial::info::{NonGenericTypeInfoCell, ObjectInfo, TypeInfo, TypeKind, TypePath, Typed};
///
/// struct Marker;
///
/// impl TypePath for Marker {
///     fn type_path() -> &'static str { "demo::Marker" }
///     fn type_name() -> &'static str { "Marker" }
///     fn type_ident() -> &'static str { "Marker" }
/// }
///
/// impl Typed for Marker {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::new::<Self>(TypeKind::Object(ObjectInfo::new(Vec::new())))
///                 .with_constructor(|| Box::new(Marker))
///         })
///     }
/// }
///
/// assert!(Marker::type_info().has_constructor());
/// ```
pub type NonGenericTypeInfoCell = NonGenericTypeCell<TypeInfo>;

impl<T: CellContent> NonGenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored value, initializing it with `f` on first use.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> T) -> &T {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericTypeCell

/// Storage of one value per generic instantiation.
pub struct GenericTypeCell<T: CellContent>(RwLock<TypeIdMap<&'static T>>);

/// Storage of the [`TypeInfo`] of generic types.
pub type GenericTypeInfoCell = GenericTypeCell<TypeInfo>;

/// Storage of the generated paths of generic types.
///
/// ```
/// use vc_serial::info::{GenericTypePathCell, TypePath, concat};
///
/// struct Wrapper<T>(T);
///
/// impl<T: TypePath> TypePath for Wrapper<T> {
///     fn type_path() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| concat(&["demo::Wrapper[", T::type_path(), "]"]))
///     }
///     fn type_name() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| concat(&["Wrapper[", T::type_name(), "]"]))
///     }
///     fn type_ident() -> &'static str { "Wrapper" }
/// }
///
/// assert_eq!(<Wrapper<u8>>::type_path(), "demo::Wrapper[u8]");
/// assert_eq!(<Wrapper<String>>::type_name(), "Wrapper[String]");
/// ```
pub type GenericTypePathCell = GenericTypeCell<String>;

impl<T: CellContent> GenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the value of instantiation `G`, creating it with `f` on first use.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        let found = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied();

        match found {
            Some(value) => value,
            None => {
                // Built outside the lock, the builder may query other cells.
                let value = f();
                *self
                    .0
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get_or_insert(type_id, || Box::leak(Box::new(value)))
            }
        }
    }
}

impl<T: CellContent> Default for GenericTypeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// concat

/// Concatenates string slices into one allocation.
///
/// Used to build the paths of generic types.
pub fn concat(parts: &[&str]) -> String {
    let mut text = String::with_capacity(parts.iter().map(|part| part.len()).sum());
    parts.iter().for_each(|part| text.push_str(part));
    text
}
