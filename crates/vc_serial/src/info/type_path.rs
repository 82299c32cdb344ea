use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// TypePath

/// Static, stable names of a type.
///
/// Names follow the type-name grammar understood by
/// [`TagTypeRegistry::resolve_type`]: generic arguments are written in
/// square brackets and `Vec<T>` is written `T[]`.
///
/// | Type                 | `type_path`                   | `type_name`        | `type_ident` |
/// |----------------------|-------------------------------|--------------------|--------------|
/// | `demo::Point`        | `demo::Point`                 | `Point`            | `Point`      |
/// | `Vec<i32>`           | `i32[]`                       | `i32[]`            | `Vec`        |
/// | `demo::Pair<u8, u8>` | `demo::Pair[u8,u8]`           | `Pair[u8,u8]`      | `Pair`       |
///
/// Implemented by `#[derive(Typed)]`. Names never start with `::`.
///
/// [`TagTypeRegistry::resolve_type`]: crate::registry::TagTypeRegistry::resolve_type
pub trait TypePath: 'static {
    /// Unique path including generic arguments.
    fn type_path() -> &'static str;

    /// Path without the module prefix, may be shared by several types.
    fn type_name() -> &'static str;

    /// Short name without module or generics.
    fn type_ident() -> &'static str;

    /// Module of the definition, `None` for built-in types.
    fn module_path() -> Option<&'static str> {
        None
    }
}

// -----------------------------------------------------------------------------
// TypePathTable

/// Function table over a [`TypePath`] implementation.
#[derive(Clone, Copy)]
pub struct TypePathTable {
    type_path: fn() -> &'static str,
    type_name: fn() -> &'static str,
    type_ident: fn() -> &'static str,
    module_path: fn() -> Option<&'static str>,
}

impl TypePathTable {
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self {
            type_path: T::type_path,
            type_name: T::type_name,
            type_ident: T::type_ident,
            module_path: T::module_path,
        }
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        (self.type_path)()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        (self.type_ident)()
    }

    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        (self.module_path)()
    }
}

impl fmt::Debug for TypePathTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypePathTable")
            .field("type_path", &self.path())
            .field("type_name", &self.name())
            .field("type_ident", &self.ident())
            .field("module_path", &self.module_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Type

/// A [`TypeId`] together with the type's names.
///
/// Equality and hashing only use the [`TypeId`].
#[derive(Clone, Copy)]
pub struct Type {
    type_path_table: TypePathTable,
    type_id: TypeId,
}

impl Type {
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self {
            type_path_table: TypePathTable::of::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.type_path_table.path()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.type_path_table.name()
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.type_path_table.ident()
    }

    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        self.type_path_table.module_path()
    }

    #[inline]
    pub fn type_path_table(&self) -> &TypePathTable {
        &self.type_path_table
    }

    /// Returns `true` if this is the type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
