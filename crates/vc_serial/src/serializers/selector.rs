use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::context::SerializerContext;
use crate::descriptor::TypeDescriptor;
use crate::dynamic::{DynamicNode, DynamicNodeSerializer};
use crate::error::{ConfigurationError, SerialError};
use crate::info::{TypeInfo, Typed};
use crate::serializers::{BuiltinSerializer, SerializerFactory, YamlSerializable};

// -----------------------------------------------------------------------------
// SerializerSelector

/// Binds types to serializers.
///
/// A binding is permanent: the first serializer found for a type serves it
/// for the lifetime of the selector.
///
/// # Examples
///
/// ```
/// use vc_serial::info::Typed;
/// use vc_serial::settings::SerializerSettings;
///
/// let settings = SerializerSettings::new();
/// let selector = settings.selector();
/// assert!(!selector.is_bound(u32::type_info()));
/// ```
pub struct SerializerSelector {
    cache: RwLock<TypeIdMap<Arc<dyn YamlSerializable>>>,
    factories: RwLock<Vec<Arc<dyn SerializerFactory>>>,
}

impl Default for SerializerSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerSelector {
    /// A selector with the [`DynamicNode`] serializer bound.
    pub fn new() -> Self {
        let mut cache = TypeIdMap::new();
        cache.insert(
            DynamicNode::type_info().id(),
            Arc::new(DynamicNodeSerializer) as Arc<dyn YamlSerializable>,
        );
        Self {
            cache: RwLock::new(cache),
            factories: RwLock::new(Vec::new()),
        }
    }

    /// Binds `serializer` to `info`.
    ///
    /// Fails if the type is already bound, explicitly or by an earlier
    /// lookup.
    pub fn add_serializer(
        &self,
        info: &'static TypeInfo,
        serializer: Arc<dyn YamlSerializable>,
    ) -> Result<(), ConfigurationError> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.contains(&info.id()) {
            return Err(ConfigurationError::SerializerAlreadyBound(info.type_path()));
        }
        cache.insert(info.id(), serializer);
        Ok(())
    }

    /// Appends a factory, consulted after the ones added before it.
    pub fn add_serializer_factory(&self, factory: Arc<dyn SerializerFactory>) {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(factory);
    }

    pub fn is_bound(&self, info: &'static TypeInfo) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&info.id())
    }

    /// The serializer of the described type, binding one on first use.
    ///
    /// Factories run without any lock held, so they may resolve the
    /// serializers of nested types through `cx`. When two lookups race on
    /// the same type the first binding wins and both return it.
    pub fn get_serializer(
        &self,
        cx: &SerializerContext<'_>,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<dyn YamlSerializable>, SerialError> {
        let id = descriptor.info().id();
        if let Some(found) = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&id) {
            return Ok(found.clone());
        }

        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner).clone();
        let created = factories
            .iter()
            .find_map(|factory| factory.try_create(cx, descriptor));
        let candidate = match created {
            Some(serializer) => serializer,
            None => match BuiltinSerializer::for_category(descriptor.category()) {
                Some(builtin) => Arc::new(builtin) as Arc<dyn YamlSerializable>,
                None => return Err(SerialError::NoSerializer(descriptor.info().type_path())),
            },
        };

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let bound = cache.get_or_insert(id, || {
            log::debug!("serializer bound to `{}`", descriptor.info().type_path());
            candidate
        });
        Ok(bound.clone())
    }
}

impl fmt::Debug for SerializerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.cache.read().unwrap_or_else(PoisonError::into_inner).len();
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("SerializerSelector")
            .field("bound", &bound)
            .field("factories", &factories)
            .finish()
    }
}
