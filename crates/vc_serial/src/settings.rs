//! Options and injected components of a serialization session.

use alloc::sync::Arc;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeRegistry;
use crate::backend::{DefaultObjectSerializerBackend, ObjectSerializerBackend};
use crate::descriptor::{DefaultTypeDescriptorFactory, MemberComparer, TypeDescriptorFactory};
use crate::error::ConfigurationError;
use crate::event::DataStyle;
use crate::info::Typed;
use crate::object_factory::{DefaultObjectFactory, ObjectFactory};
use crate::registry::{Assembly, AssemblyRegistration, TagTypeRegistry};
use crate::schema::{CoreSchema, Schema};
use crate::serializers::{SerializerFactory, SerializerSelector, YamlSerializable};

// -----------------------------------------------------------------------------
// SerializerOptions

/// Plain options, loadable from any `serde` format.
///
/// Missing fields take their default:
///
/// ```
/// use vc_serial::settings::SerializerOptions;
///
/// let options: SerializerOptions = ron::from_str("(member_mask: 3)").unwrap();
/// assert_eq!(options.member_mask, 3);
/// assert!(options.emit_tags);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Members are transferred when their mask shares a bit with this one.
    pub member_mask: u32,
    /// Write tags for values whose type differs from the declared one.
    pub emit_tags: bool,
    /// Read unresolved tags best-effort instead of failing.
    pub error_tolerant: bool,
    /// Skip mapping keys that name no member instead of failing.
    pub ignore_unmatched_members: bool,
    /// Sort members without an explicit order by name, otherwise keep the
    /// declaration order.
    pub sort_members: bool,
    pub default_style: DataStyle,
    /// Sequences of at most this many scalars are written in flow style.
    pub flow_primitive_sequence_limit: usize,
    /// Write explicit `---` and `...` document markers.
    pub emit_document_markers: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            member_mask: 1,
            emit_tags: true,
            error_tolerant: false,
            ignore_unmatched_members: false,
            sort_members: true,
            default_style: DataStyle::Any,
            flow_primitive_sequence_limit: 0,
            emit_document_markers: false,
        }
    }
}

impl SerializerOptions {
    fn comparer(&self) -> Option<MemberComparer> {
        if self.sort_members {
            Some(str::cmp)
        } else {
            None
        }
    }
}

// -----------------------------------------------------------------------------
// SerializerSettings

/// The options and every component a session shares.
///
/// Components are held in `Arc`s so several settings, and threads, can share
/// registries. Each one is replaceable through a `with_*` builder.
pub struct SerializerSettings {
    options: SerializerOptions,
    attributes: Arc<AttributeRegistry>,
    tags: Arc<TagTypeRegistry>,
    descriptors: Arc<dyn TypeDescriptorFactory>,
    selector: Arc<SerializerSelector>,
    backend: Arc<dyn ObjectSerializerBackend>,
    schema: Arc<dyn Schema>,
    object_factory: Arc<dyn ObjectFactory>,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerSettings {
    /// Settings with default options and fresh components.
    pub fn new() -> Self {
        Self::from_options(SerializerOptions::default())
    }

    pub fn from_options(options: SerializerOptions) -> Self {
        let schema: Arc<dyn Schema> = Arc::new(CoreSchema);
        let attributes = Arc::new(AttributeRegistry::new());
        Self {
            descriptors: Arc::new(DefaultTypeDescriptorFactory::new(
                attributes.clone(),
                options.comparer(),
            )),
            tags: Arc::new(TagTypeRegistry::new(schema.clone())),
            selector: Arc::new(SerializerSelector::new()),
            backend: Arc::new(DefaultObjectSerializerBackend),
            object_factory: Arc::new(DefaultObjectFactory),
            attributes,
            schema,
            options,
        }
    }

    // -------------------------------------------------------------------------
    // Builders

    /// Replaces the attribute registry and rebuilds the default descriptor
    /// factory on top of it.
    pub fn with_attribute_registry(mut self, attributes: Arc<AttributeRegistry>) -> Self {
        self.descriptors = Arc::new(DefaultTypeDescriptorFactory::new(
            attributes.clone(),
            self.options.comparer(),
        ));
        self.attributes = attributes;
        self
    }

    pub fn with_tag_registry(mut self, tags: Arc<TagTypeRegistry>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_descriptor_factory(mut self, descriptors: Arc<dyn TypeDescriptorFactory>) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn with_selector(mut self, selector: Arc<SerializerSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn ObjectSerializerBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replaces the schema along with the tag registry, whose lookups depend
    /// on it. Registrations made before are lost.
    pub fn with_schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.tags = Arc::new(TagTypeRegistry::new(schema.clone()));
        self.schema = schema;
        self
    }

    pub fn with_object_factory(mut self, object_factory: Arc<dyn ObjectFactory>) -> Self {
        self.object_factory = object_factory;
        self
    }

    // -------------------------------------------------------------------------
    // Getters

    #[inline]
    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    #[inline]
    pub fn attribute_registry(&self) -> &Arc<AttributeRegistry> {
        &self.attributes
    }

    #[inline]
    pub fn tag_registry(&self) -> &Arc<TagTypeRegistry> {
        &self.tags
    }

    #[inline]
    pub fn descriptor_factory(&self) -> &Arc<dyn TypeDescriptorFactory> {
        &self.descriptors
    }

    #[inline]
    pub fn selector(&self) -> &Arc<SerializerSelector> {
        &self.selector
    }

    #[inline]
    pub fn backend(&self) -> &Arc<dyn ObjectSerializerBackend> {
        &self.backend
    }

    #[inline]
    pub fn schema(&self) -> &Arc<dyn Schema> {
        &self.schema
    }

    #[inline]
    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Adds `T` to the `host` assembly and imports its `Tag` and `TagAlias`
    /// attributes.
    pub fn register_type<T: Typed>(&self) {
        let info = T::type_info();
        self.tags.register_type(info);
        self.tags.import_type_tags("host", info, &self.attributes);
    }

    /// Maps `tag` to `T`, see [`TagTypeRegistry::register_tag_mapping`].
    pub fn register_tag<T: Typed>(
        &self,
        tag: &str,
        is_alias: bool,
    ) -> Result<(), ConfigurationError> {
        let info = T::type_info();
        self.tags.register_type(info);
        self.tags.register_tag_mapping(tag, info, is_alias)
    }

    /// Registers an assembly and hands its factories to the selector.
    pub fn register_assembly(&self, assembly: Assembly) -> AssemblyRegistration {
        let registration = self.tags.register_assembly(assembly, &self.attributes);
        for factory in &registration.factories {
            self.selector.add_serializer_factory(factory.clone());
        }
        registration
    }

    pub fn add_serializer<T: Typed>(
        &self,
        serializer: Arc<dyn YamlSerializable>,
    ) -> Result<(), ConfigurationError> {
        self.selector.add_serializer(T::type_info(), serializer)
    }

    pub fn add_serializer_factory(&self, factory: Arc<dyn SerializerFactory>) {
        self.selector.add_serializer_factory(factory);
    }
}

impl fmt::Debug for SerializerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerSettings")
            .field("options", &self.options)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{SerializerOptions, SerializerSettings};
    use crate::event::DataStyle;

    #[test]
    fn options_from_json() {
        let options: SerializerOptions =
            serde_json::from_str(r#"{ "error_tolerant": true, "default_style": "Flow" }"#).unwrap();
        assert!(options.error_tolerant);
        assert_eq!(options.default_style, DataStyle::Flow);
        assert_eq!(options.member_mask, 1);
    }

    #[test]
    fn tag_registration() {
        let settings = SerializerSettings::new();
        settings.register_tag::<u8>("!byte", false).unwrap();
        let mapped = settings.tag_registry().type_from_tag("!byte").unwrap();
        assert_eq!(mapped.info.type_path(), "u8");
        assert!(settings.register_tag::<u8>("", false).is_err());
    }
}
