use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::attributes::Attribute;
use crate::info::{CollectionInfo, DictionaryInfo, DynamicInfo, NullableInfo};
use crate::info::{ObjectInfo, ScalarInfo, Type, TypePath};

// -----------------------------------------------------------------------------
// TypeKind

/// Shape of a type, deciding which built-in serializer handles it.
#[derive(Debug)]
pub enum TypeKind {
    /// Named members, written as a mapping.
    Object(ObjectInfo),
    /// Items, written as a sequence.
    Collection(CollectionInfo),
    /// Key-value pairs, written as a mapping.
    Dictionary(DictionaryInfo),
    /// A single scalar node.
    Scalar(ScalarInfo),
    /// An optional value, `null` when empty.
    Nullable(NullableInfo),
    /// A polymorphic slot, the held value decides its own shape.
    Dynamic(DynamicInfo),
    /// No structure known to the engine; needs a registered serializer.
    Opaque,
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Object(_) => "Object",
            Self::Collection(_) => "Collection",
            Self::Dictionary(_) => "Dictionary",
            Self::Scalar(_) => "Scalar",
            Self::Nullable(_) => "Nullable",
            Self::Dynamic(_) => "Dynamic",
            Self::Opaque => "Opaque",
        }
    }
}

// -----------------------------------------------------------------------------
// GenericInfo

/// The generic definition a type was instantiated from.
#[derive(Debug, Clone)]
pub struct GenericInfo {
    definition: &'static str,
    ident: &'static str,
    args: Box<[Type]>,
}

impl GenericInfo {
    /// - `definition`: path without arguments, e.g. `demo::Pair`.
    /// - `ident`: e.g. `Pair`.
    pub fn new(definition: &'static str, ident: &'static str, args: Vec<Type>) -> Self {
        Self {
            definition,
            ident,
            args: args.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn definition(&self) -> &'static str {
        self.definition
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    #[inline]
    pub fn args(&self) -> &[Type] {
        &self.args
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Static description of a type.
///
/// Obtained through [`Typed::type_info`](crate::info::Typed::type_info),
/// which `#[derive(Typed)]` implements.
///
/// ```
/// use vc_serial::info::{TypeKind, Typed};
///
/// let info = <Vec<u16>>::type_info();
/// assert_eq!(info.type_path(), "u16[]");
///
/// let TypeKind::Collection(list) = info.kind() else { unreachable!() };
/// assert!(list.is_array());
/// assert_eq!(list.item_info().type_path(), "u16");
/// ```
pub struct TypeInfo {
    ty: Type,
    kind: TypeKind,
    attributes: Box<[Attribute]>,
    constructor: Option<fn() -> Box<dyn Any>>,
    generic: Option<GenericInfo>,
    compiler_generated: bool,
}

impl TypeInfo {
    pub fn new<T: TypePath>(kind: TypeKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            attributes: Box::new([]),
            constructor: None,
            generic: None,
            compiler_generated: false,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes.into_boxed_slice();
        self
    }

    /// Sets the function creating an empty instance before reading.
    pub fn with_constructor(mut self, constructor: fn() -> Box<dyn Any>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Uses [`Default`] as constructor.
    pub fn with_default<T: Default + Any>(self) -> Self {
        self.with_constructor(|| Box::new(T::default()))
    }

    pub fn with_generic(mut self, generic: GenericInfo) -> Self {
        self.generic = Some(generic);
        self
    }

    /// Marks a type that only exists as an implementation detail.
    ///
    /// Such types never get a tag on output.
    pub fn with_compiler_generated(mut self, compiler_generated: bool) -> Self {
        self.compiler_generated = compiler_generated;
        self
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    #[inline]
    pub fn type_ident(&self) -> &'static str {
        self.ty.ident()
    }

    #[inline]
    pub fn module_path(&self) -> Option<&'static str> {
        self.ty.module_path()
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Attributes declared on the type itself.
    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn generic(&self) -> Option<&GenericInfo> {
        self.generic.as_ref()
    }

    #[inline]
    pub fn is_compiler_generated(&self) -> bool {
        self.compiler_generated
    }

    #[inline]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Creates an empty instance, if the type has a constructor.
    pub fn construct(&self) -> Option<Box<dyn Any>> {
        self.constructor.map(|constructor| constructor())
    }

    pub fn as_object(&self) -> Option<&ObjectInfo> {
        match &self.kind {
            TypeKind::Object(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionInfo> {
        match &self.kind {
            TypeKind::Collection(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&DictionaryInfo> {
        match &self.kind {
            TypeKind::Dictionary(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarInfo> {
        match &self.kind {
            TypeKind::Scalar(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_nullable(&self) -> Option<&NullableInfo> {
        match &self.kind {
            TypeKind::Nullable(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_dynamic(&self) -> Option<&DynamicInfo> {
        match &self.kind {
            TypeKind::Dynamic(info) => Some(info),
            _ => None,
        }
    }

    /// Types directly reachable from this one: field, item, key, value and
    /// inner types.
    pub fn dependencies(&self) -> Vec<&'static TypeInfo> {
        match &self.kind {
            TypeKind::Object(object) => object.fields().iter().map(|f| f.type_info()).collect(),
            TypeKind::Collection(list) => alloc::vec![list.item_info()],
            TypeKind::Dictionary(map) => alloc::vec![map.key_info(), map.value_info()],
            TypeKind::Nullable(option) => alloc::vec![option.inner_info()],
            TypeKind::Scalar(_) | TypeKind::Dynamic(_) | TypeKind::Opaque => Vec::new(),
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type", &self.ty)
            .field("kind", &self.kind.name())
            .field("generic", &self.generic)
            .field("compiler_generated", &self.compiler_generated)
            .finish_non_exhaustive()
    }
}
