use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::backend::ObjectSerializerBackend;
use crate::context::SerializerContext;
use crate::descriptor::TypeDescriptor;
use crate::error::SerialError;
use crate::event::DataStyle;
use crate::info::TypeInfo;
use crate::settings::SerializerSettings;

// -----------------------------------------------------------------------------
// ReadOutcome

/// Result of reading a node.
pub enum ReadOutcome {
    /// A new value.
    Value(Box<dyn Any>),
    /// The node was read into the existing value passed by the caller.
    Merged,
}

impl ReadOutcome {
    /// The new value, an error for [`Merged`](Self::Merged).
    pub fn into_value(self) -> Result<Box<dyn Any>, SerialError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Merged => Err(SerialError::custom(
                "the node was merged into an existing value",
            )),
        }
    }
}

impl fmt::Debug for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(..)"),
            Self::Merged => f.write_str("Merged"),
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectContext

/// The state of one node being read or written by a serializer.
pub struct ObjectContext<'c, 'a> {
    context: &'c mut SerializerContext<'a>,
    descriptor: Arc<TypeDescriptor>,
    tag: Option<String>,
    style: DataStyle,
}

impl<'c, 'a> ObjectContext<'c, 'a> {
    pub fn new(
        context: &'c mut SerializerContext<'a>,
        descriptor: Arc<TypeDescriptor>,
        tag: Option<String>,
        style: DataStyle,
    ) -> Self {
        Self {
            context,
            descriptor,
            tag,
            style,
        }
    }

    /// The enclosing pass, for recursive reads and writes.
    #[inline]
    pub fn context(&mut self) -> &mut SerializerContext<'a> {
        self.context
    }

    #[inline]
    pub fn settings(&self) -> &'a SerializerSettings {
        self.context.settings()
    }

    #[inline]
    pub fn backend(&self) -> &'a dyn ObjectSerializerBackend {
        &**self.settings().backend()
    }

    #[inline]
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        self.descriptor.info()
    }

    /// The tag of the node: read from the document, or to be written.
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Style requested by the caller, `Any` if none.
    #[inline]
    pub fn style(&self) -> DataStyle {
        self.style
    }
}

impl fmt::Debug for ObjectContext<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectContext")
            .field("type", &self.descriptor.info().type_path())
            .field("tag", &self.tag)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}
