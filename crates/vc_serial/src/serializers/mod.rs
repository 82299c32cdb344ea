//! Serializers and their selection.
//!
//! A [`YamlSerializable`] reads and writes the nodes of one type. The
//! [`SerializerSelector`] binds each type to a serializer once: registered
//! serializers first, then [`SerializerFactory`]s in registration order,
//! then the [`BuiltinSerializer`] matching the type's category.

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod collection;
mod dictionary;
mod object;
mod scalar;
mod selector;

// -----------------------------------------------------------------------------
// Exports

pub use builtin::BuiltinSerializer;
pub use selector::SerializerSelector;

use alloc::sync::Arc;
use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome, SerializerContext};
use crate::descriptor::TypeDescriptor;
use crate::error::SerialError;

// -----------------------------------------------------------------------------
// Traits

/// Reads and writes the nodes of one type.
pub trait YamlSerializable: Send + Sync {
    /// Reads the node under the cursor.
    ///
    /// When `existing` is given, the node is read into it and
    /// [`ReadOutcome::Merged`] is returned, if the serializer supports it.
    fn read_yaml(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        existing: Option<&mut dyn Any>,
    ) -> Result<ReadOutcome, SerialError>;

    /// Writes `value`, whose type is the one of `cx`.
    fn write_yaml(&self, cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError>;
}

/// Creates serializers for the types it recognizes.
pub trait SerializerFactory: Send + Sync {
    /// `None` if the factory does not handle the type.
    fn try_create(
        &self,
        cx: &SerializerContext<'_>,
        descriptor: &TypeDescriptor,
    ) -> Option<Arc<dyn YamlSerializable>>;
}
