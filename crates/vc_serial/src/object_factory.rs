//! Creation of instances before their members are read.

use alloc::boxed::Box;
use core::any::Any;

use crate::error::{ConfigurationError, SerialError};
use crate::info::TypeInfo;

/// Creates the empty instance a mapping or sequence is read into.
pub trait ObjectFactory: Send + Sync {
    fn create(&self, info: &'static TypeInfo) -> Result<Box<dyn Any>, SerialError>;
}

/// Uses the constructor of the [`TypeInfo`].
///
/// ```
/// use vc_serial::info::Typed;
/// use vc_serial::object_factory::{DefaultObjectFactory, ObjectFactory};
///
/// let list = DefaultObjectFactory.create(<Vec<u8>>::type_info()).unwrap();
/// assert_eq!(list.downcast_ref::<Vec<u8>>(), Some(&Vec::new()));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {
    fn create(&self, info: &'static TypeInfo) -> Result<Box<dyn Any>, SerialError> {
        info.construct()
            .ok_or_else(|| ConfigurationError::MissingConstructor(info.type_path()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultObjectFactory, ObjectFactory};
    use crate::error::{ConfigurationError, SerialError};
    use crate::info::{TypeInfo, TypeKind, TypePath, Typed};
    use crate::info::NonGenericTypeInfoCell;

    struct Handle;

    impl TypePath for Handle {
        fn type_path() -> &'static str {
            "tests::Handle"
        }
        fn type_name() -> &'static str {
            "Handle"
        }
        fn type_ident() -> &'static str {
            "Handle"
        }
    }

    impl Typed for Handle {
        fn type_info() -> &'static TypeInfo {
            static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| TypeInfo::new::<Self>(TypeKind::Opaque))
        }
    }

    #[test]
    fn missing_constructor() {
        let err = DefaultObjectFactory.create(Handle::type_info()).unwrap_err();
        assert!(matches!(
            err,
            SerialError::Configuration(ConfigurationError::MissingConstructor("tests::Handle"))
        ));
    }
}
