use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome};
use crate::descriptor::DescriptorCategory;
use crate::error::SerialError;
use crate::serializers::{YamlSerializable, collection, dictionary, object, scalar};

// -----------------------------------------------------------------------------
// BuiltinSerializer

/// The serializers shipped with the engine, one per structural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSerializer {
    Scalar,
    Object,
    Collection,
    Dictionary,
}

impl BuiltinSerializer {
    /// The built-in serializer of a category, `None` for the categories
    /// handled by the context itself or by nothing.
    pub fn for_category(category: DescriptorCategory) -> Option<Self> {
        match category {
            DescriptorCategory::Primitive => Some(Self::Scalar),
            DescriptorCategory::Object => Some(Self::Object),
            DescriptorCategory::Collection => Some(Self::Collection),
            DescriptorCategory::Dictionary => Some(Self::Dictionary),
            DescriptorCategory::Nullable | DescriptorCategory::Dynamic | DescriptorCategory::Opaque => None,
        }
    }
}

impl YamlSerializable for BuiltinSerializer {
    fn read_yaml(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        existing: Option<&mut dyn Any>,
    ) -> Result<ReadOutcome, SerialError> {
        match self {
            Self::Scalar => scalar::read(cx),
            Self::Object => object::read(cx, existing),
            Self::Collection => collection::read(cx, existing),
            Self::Dictionary => dictionary::read(cx, existing),
        }
    }

    fn write_yaml(&self, cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
        match self {
            Self::Scalar => scalar::write(cx, value),
            Self::Object => object::write(cx, value),
            Self::Collection => collection::write(cx, value),
            Self::Dictionary => dictionary::write(cx, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BuiltinSerializer;
    use crate::descriptor::DescriptorCategory;

    #[test]
    fn categories() {
        assert_eq!(
            BuiltinSerializer::for_category(DescriptorCategory::Primitive),
            Some(BuiltinSerializer::Scalar)
        );
        assert_eq!(
            BuiltinSerializer::for_category(DescriptorCategory::Dictionary),
            Some(BuiltinSerializer::Dictionary)
        );
        assert_eq!(BuiltinSerializer::for_category(DescriptorCategory::Opaque), None);
        assert_eq!(BuiltinSerializer::for_category(DescriptorCategory::Nullable), None);
    }
}
