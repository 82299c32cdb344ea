use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::info::{Type, TypeInfo, Typed};

// -----------------------------------------------------------------------------
// CollectionInfo

/// Type-erased operations of a sequence container.
#[derive(Clone, Copy)]
pub struct CollectionOps {
    pub len: fn(&dyn Any) -> usize,
    pub iter: for<'a> fn(&'a dyn Any) -> Box<dyn Iterator<Item = &'a dyn Any> + 'a>,
    /// Appends an item. Returns `false` if the container or the item has the wrong type.
    pub push: fn(&mut dyn Any, Box<dyn Any>) -> bool,
    pub clear: fn(&mut dyn Any),
}

/// A sequence of items of one type.
pub struct CollectionInfo {
    item: Type,
    item_info: fn() -> &'static TypeInfo,
    is_array: bool,
    ops: CollectionOps,
}

impl CollectionInfo {
    /// Creates the info of a collection with items of type `T`.
    ///
    /// `is_array` marks the container written `T[]` by the type-name grammar.
    pub fn new<T: Typed>(is_array: bool, ops: CollectionOps) -> Self {
        Self {
            item: Type::of::<T>(),
            item_info: T::type_info,
            is_array,
            ops,
        }
    }

    #[inline]
    pub fn item(&self) -> Type {
        self.item
    }

    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    #[inline]
    pub fn ops(&self) -> &CollectionOps {
        &self.ops
    }
}

impl fmt::Debug for CollectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionInfo")
            .field("item", &self.item)
            .field("is_array", &self.is_array)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// DictionaryInfo

/// Type-erased operations of a key-value container.
#[derive(Clone, Copy)]
pub struct DictionaryOps {
    pub len: fn(&dyn Any) -> usize,
    pub iter: for<'a> fn(&'a dyn Any) -> Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>,
    /// Inserts a pair. Returns `false` if any of the three has the wrong type.
    pub insert: fn(&mut dyn Any, Box<dyn Any>, Box<dyn Any>) -> bool,
    pub clear: fn(&mut dyn Any),
}

/// A map from keys of one type to values of another.
pub struct DictionaryInfo {
    key: Type,
    key_info: fn() -> &'static TypeInfo,
    value: Type,
    value_info: fn() -> &'static TypeInfo,
    ops: DictionaryOps,
}

impl DictionaryInfo {
    pub fn new<K: Typed, V: Typed>(ops: DictionaryOps) -> Self {
        Self {
            key: Type::of::<K>(),
            key_info: K::type_info,
            value: Type::of::<V>(),
            value_info: V::type_info,
            ops,
        }
    }

    #[inline]
    pub fn key(&self) -> Type {
        self.key
    }

    #[inline]
    pub fn key_info(&self) -> &'static TypeInfo {
        (self.key_info)()
    }

    #[inline]
    pub fn value(&self) -> Type {
        self.value
    }

    #[inline]
    pub fn value_info(&self) -> &'static TypeInfo {
        (self.value_info)()
    }

    #[inline]
    pub fn ops(&self) -> &DictionaryOps {
        &self.ops
    }
}

impl fmt::Debug for DictionaryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionaryInfo")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// NullableInfo

/// An optional value, such as `Option<T>`.
pub struct NullableInfo {
    inner: Type,
    inner_info: fn() -> &'static TypeInfo,
    get: fn(&dyn Any) -> Option<&dyn Any>,
    none: fn() -> Box<dyn Any>,
    some: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
}

impl NullableInfo {
    /// - `get`: the inner value, `None` when empty.
    /// - `none`: creates an empty value.
    /// - `some`: wraps an inner value, `None` if it has the wrong type.
    pub fn new<T: Typed>(
        get: fn(&dyn Any) -> Option<&dyn Any>,
        none: fn() -> Box<dyn Any>,
        some: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            inner: Type::of::<T>(),
            inner_info: T::type_info,
            get,
            none,
            some,
        }
    }

    #[inline]
    pub fn inner(&self) -> Type {
        self.inner
    }

    #[inline]
    pub fn inner_info(&self) -> &'static TypeInfo {
        (self.inner_info)()
    }

    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(value)
    }

    #[inline]
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }

    #[inline]
    pub fn some(&self, inner: Box<dyn Any>) -> Option<Box<dyn Any>> {
        (self.some)(inner)
    }
}

impl fmt::Debug for NullableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullableInfo")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// DynamicInfo

/// A slot holding a value of any registered type, such as `Box<dyn Any>`.
pub struct DynamicInfo {
    unwrap: fn(&dyn Any) -> Option<&dyn Any>,
    wrap: fn(Box<dyn Any>) -> Box<dyn Any>,
}

impl DynamicInfo {
    pub fn new(
        unwrap: fn(&dyn Any) -> Option<&dyn Any>,
        wrap: fn(Box<dyn Any>) -> Box<dyn Any>,
    ) -> Self {
        Self { unwrap, wrap }
    }

    /// The value held by the slot.
    #[inline]
    pub fn unwrap<'a>(&self, slot: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.unwrap)(slot)
    }

    /// Builds a slot around `value`.
    #[inline]
    pub fn wrap(&self, value: Box<dyn Any>) -> Box<dyn Any> {
        (self.wrap)(value)
    }
}

impl fmt::Debug for DynamicInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicInfo").finish_non_exhaustive()
    }
}
