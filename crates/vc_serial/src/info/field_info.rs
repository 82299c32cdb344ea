use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use bitflags::bitflags;

use crate::attributes::Attribute;
use crate::info::{Type, TypeInfo, Typed};

// -----------------------------------------------------------------------------
// FieldFlags

bitflags! {
    /// Static properties of a field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Declared `pub`.
        const PUBLIC = 1;
        /// The field embeds the type's base. Its members are flattened into
        /// the owner and its type-level attributes are inherited.
        const BASE = 1 << 1;
    }
}

// -----------------------------------------------------------------------------
// FieldAccess

/// Projects an owner to one of its fields.
pub type FieldGetter = fn(&dyn Any) -> Option<&dyn Any>;

/// Projects an owner to one of its fields, mutably.
pub type FieldGetterMut = fn(&mut dyn Any) -> Option<&mut dyn Any>;

/// Replaces a field. Returns `false` if the owner or value has the wrong type.
pub type FieldSetter = fn(&mut dyn Any, Box<dyn Any>) -> bool;

/// Accessors of one field, all of them type erased.
///
/// Getters return `None` when given an owner of another type.
#[derive(Clone, Copy)]
pub struct FieldAccess {
    pub get: FieldGetter,
    pub get_mut: FieldGetterMut,
    /// `None` for read-only fields, which can only be filled in place.
    pub set: Option<FieldSetter>,
}

impl fmt::Debug for FieldAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccess")
            .field("settable", &self.set.is_some())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// A named field of an object type.
pub struct FieldInfo {
    name: &'static str,
    index: usize,
    ty: Type,
    type_info: fn() -> &'static TypeInfo,
    access: FieldAccess,
    attributes: Box<[Attribute]>,
    flags: FieldFlags,
}

impl FieldInfo {
    /// Creates a field of type `T` at declaration position `index`.
    pub fn new<T: Typed>(name: &'static str, index: usize, access: FieldAccess) -> Self {
        Self {
            name,
            index,
            ty: Type::of::<T>(),
            type_info: T::type_info,
            access,
            attributes: Box::new([]),
            flags: FieldFlags::empty(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes.into_boxed_slice();
        self
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position in the declaration, starting at `0`.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    /// The lazily evaluated accessor of [`FieldInfo::type_info`].
    ///
    /// Recursive types must not evaluate it while their own info is built.
    #[inline]
    pub fn type_info_fn(&self) -> fn() -> &'static TypeInfo {
        self.type_info
    }

    #[inline]
    pub fn access(&self) -> &FieldAccess {
        &self.access
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(FieldFlags::PUBLIC)
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        self.flags.contains(FieldFlags::BASE)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("ty", &self.ty)
            .field("flags", &self.flags)
            .field("attributes", &self.attributes)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ObjectInfo

/// Layout of a type with named fields.
#[derive(Debug)]
pub struct ObjectInfo {
    fields: Box<[FieldInfo]>,
}

impl ObjectInfo {
    pub fn new(fields: Vec<FieldInfo>) -> Self {
        Self {
            fields: fields.into_boxed_slice(),
        }
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The field embedding the base type, if any.
    pub fn base(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| field.is_base())
    }
}
