use alloc::boxed::Box;
use core::any::Any;

use crate::info::{DynamicInfo, NonGenericTypeInfoCell, TypeInfo, TypeKind, TypePath, Typed};

/// The polymorphic slot: the tag of the node decides the stored type.
impl TypePath for Box<dyn Any> {
    fn type_path() -> &'static str {
        "Any"
    }

    fn type_name() -> &'static str {
        "Any"
    }

    fn type_ident() -> &'static str {
        "Any"
    }
}

impl Typed for Box<dyn Any> {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            let dynamic = DynamicInfo::new(
                |slot| slot.downcast_ref::<Box<dyn Any>>().map(|held| &**held),
                |value| Box::new(value) as Box<dyn Any>,
            );
            TypeInfo::new::<Self>(TypeKind::Dynamic(dynamic)).with_constructor(|| {
                Box::new(Box::new(()) as Box<dyn Any>) as Box<dyn Any>
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::Any;

    use crate::info::Typed;

    #[test]
    fn slot_round_trip() {
        let dynamic = <Box<dyn Any>>::type_info().as_dynamic().unwrap();

        let slot = dynamic.wrap(Box::new(5_i32));
        let held = dynamic.unwrap(&*slot).unwrap();
        assert_eq!(held.downcast_ref::<i32>(), Some(&5));

        assert!(dynamic.unwrap(&5_i32).is_none());
    }
}
