use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;
use core::any::Any;
use core::hash::Hash;

use vc_utils::hash::FixedHashState;

use crate::info::{CollectionInfo, CollectionOps, DictionaryInfo, DictionaryOps};
use crate::info::{GenericInfo, GenericTypeInfoCell, GenericTypePathCell, Type};
use crate::info::{TypeInfo, TypeKind, TypePath, Typed, concat};

// -----------------------------------------------------------------------------
// Vec / VecDeque

fn vec_iter<T: Typed>(value: &dyn Any) -> Box<dyn Iterator<Item = &dyn Any> + '_> {
    match value.downcast_ref::<Vec<T>>() {
        Some(list) => Box::new(list.iter().map(|item| item as &dyn Any)),
        None => Box::new(core::iter::empty()),
    }
}

impl<T: Typed> TypePath for Vec<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&[T::type_path(), "[]"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&[T::type_name(), "[]"]))
    }

    fn type_ident() -> &'static str {
        "Vec"
    }

    fn module_path() -> Option<&'static str> {
        Some("alloc::vec")
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            let ops = CollectionOps {
                len: |list| list.downcast_ref::<Self>().map_or(0, Vec::len),
                iter: vec_iter::<T>,
                push: |list, item| match (list.downcast_mut::<Self>(), item.downcast::<T>()) {
                    (Some(list), Ok(item)) => {
                        list.push(*item);
                        true
                    }
                    _ => false,
                },
                clear: |list| {
                    if let Some(list) = list.downcast_mut::<Self>() {
                        list.clear();
                    }
                },
            };
            TypeInfo::new::<Self>(TypeKind::Collection(CollectionInfo::new::<T>(true, ops)))
                .with_default::<Self>()
        })
    }
}

fn deque_iter<T: Typed>(value: &dyn Any) -> Box<dyn Iterator<Item = &dyn Any> + '_> {
    match value.downcast_ref::<VecDeque<T>>() {
        Some(list) => Box::new(list.iter().map(|item| item as &dyn Any)),
        None => Box::new(core::iter::empty()),
    }
}

impl<T: Typed> TypePath for VecDeque<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["alloc::collections::VecDeque[", T::type_path(), "]"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["VecDeque[", T::type_name(), "]"]))
    }

    fn type_ident() -> &'static str {
        "VecDeque"
    }

    fn module_path() -> Option<&'static str> {
        Some("alloc::collections")
    }
}

impl<T: Typed> Typed for VecDeque<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            let ops = CollectionOps {
                len: |list| list.downcast_ref::<Self>().map_or(0, VecDeque::len),
                iter: deque_iter::<T>,
                push: |list, item| match (list.downcast_mut::<Self>(), item.downcast::<T>()) {
                    (Some(list), Ok(item)) => {
                        list.push_back(*item);
                        true
                    }
                    _ => false,
                },
                clear: |list| {
                    if let Some(list) = list.downcast_mut::<Self>() {
                        list.clear();
                    }
                },
            };
            TypeInfo::new::<Self>(TypeKind::Collection(CollectionInfo::new::<T>(false, ops)))
                .with_default::<Self>()
                .with_generic(GenericInfo::new(
                    "alloc::collections::VecDeque",
                    "VecDeque",
                    alloc::vec![Type::of::<T>()],
                ))
        })
    }
}

// -----------------------------------------------------------------------------
// Maps

/// Implements `TypePath` and `Typed` for a map type whose
/// `iter`/`insert`/`clear`/`len` have the usual signatures.
macro_rules! impl_dictionary {
    (
        $map:ident <K, V $(, $state:ty)?> where K: $($key_bound:path),+ ;
        ident = $ident:literal,
        definition = $definition:literal,
        module = $module:literal $(,)?
    ) => {
        impl<K: Typed $(+ $key_bound)+, V: Typed> TypePath for $map<K, V $(, $state)?> {
            fn type_path() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    concat(&[$definition, "[", K::type_path(), ",", V::type_path(), "]"])
                })
            }

            fn type_name() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    concat(&[$ident, "[", K::type_name(), ",", V::type_name(), "]"])
                })
            }

            fn type_ident() -> &'static str {
                $ident
            }

            fn module_path() -> Option<&'static str> {
                Some($module)
            }
        }

        impl<K: Typed $(+ $key_bound)+, V: Typed> Typed for $map<K, V $(, $state)?> {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    fn iter<K: Typed $(+ $key_bound)+, V: Typed>(
                        value: &dyn Any,
                    ) -> Box<dyn Iterator<Item = (&dyn Any, &dyn Any)> + '_> {
                        match value.downcast_ref::<$map<K, V $(, $state)?>>() {
                            Some(map) => Box::new(
                                map.iter().map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
                            ),
                            None => Box::new(core::iter::empty()),
                        }
                    }

                    let ops = DictionaryOps {
                        len: |map| map.downcast_ref::<Self>().map_or(0, |map| map.len()),
                        iter: iter::<K, V>,
                        insert: |map, key, value| {
                            match (map.downcast_mut::<Self>(), key.downcast::<K>(), value.downcast::<V>()) {
                                (Some(map), Ok(key), Ok(value)) => {
                                    map.insert(*key, *value);
                                    true
                                }
                                _ => false,
                            }
                        },
                        clear: |map| {
                            if let Some(map) = map.downcast_mut::<Self>() {
                                map.clear();
                            }
                        },
                    };
                    TypeInfo::new::<Self>(TypeKind::Dictionary(DictionaryInfo::new::<K, V>(ops)))
                        .with_default::<Self>()
                        .with_generic(GenericInfo::new(
                            $definition,
                            $ident,
                            alloc::vec![Type::of::<K>(), Type::of::<V>()],
                        ))
                })
            }
        }
    };
}

impl_dictionary!(
    BTreeMap<K, V> where K: Ord;
    ident = "BTreeMap",
    definition = "alloc::collections::BTreeMap",
    module = "alloc::collections",
);

type StdHashMap<K, V> = std::collections::HashMap<K, V>;

impl_dictionary!(
    StdHashMap<K, V> where K: Eq, Hash;
    ident = "HashMap",
    definition = "std::collections::HashMap",
    module = "std::collections",
);

type FixedHashMap<K, V, S> = vc_utils::hash::HashMap<K, V, S>;

impl_dictionary!(
    FixedHashMap<K, V, FixedHashState> where K: Eq, Hash;
    ident = "HashMap",
    definition = "vc_utils::hash::HashMap",
    module = "vc_utils::hash",
);
