use alloc::boxed::Box;
use core::any::Any;

use crate::info::{GenericInfo, GenericTypeInfoCell, GenericTypePathCell, NullableInfo};
use crate::info::{Type, TypeInfo, TypeKind, TypePath, Typed, concat};

impl<T: Typed> TypePath for Option<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["core::option::Option[", T::type_path(), "]"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Option[", T::type_name(), "]"]))
    }

    fn type_ident() -> &'static str {
        "Option"
    }

    fn module_path() -> Option<&'static str> {
        Some("core::option")
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            let nullable = NullableInfo::new::<T>(
                |value| match value.downcast_ref::<Self>() {
                    Some(Some(inner)) => Some(inner as &dyn Any),
                    _ => None,
                },
                || Box::new(None::<T>) as Box<dyn Any>,
                |inner| match inner.downcast::<T>() {
                    Ok(inner) => Some(Box::new(Some(*inner)) as Box<dyn Any>),
                    Err(_) => None,
                },
            );
            TypeInfo::new::<Self>(TypeKind::Nullable(nullable))
                .with_default::<Self>()
                .with_generic(GenericInfo::new(
                    "core::option::Option",
                    "Option",
                    alloc::vec![Type::of::<T>()],
                ))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::info::Typed;

    #[test]
    fn option_wraps_and_unwraps() {
        let nullable = <Option<u8>>::type_info().as_nullable().unwrap();
        assert_eq!(nullable.inner_info().type_path(), "u8");

        let empty = nullable.none();
        assert!(nullable.get(&*empty).is_none());

        let full = nullable.some(Box::new(7_u8)).unwrap();
        let inner = nullable.get(&*full).unwrap();
        assert_eq!(inner.downcast_ref::<u8>(), Some(&7));

        assert!(nullable.some(Box::new("wrong")).is_none());
    }
}
