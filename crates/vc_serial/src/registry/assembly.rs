use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::error::Error;
use core::fmt;
use std::panic::catch_unwind;

use crate::attributes::{Attribute, AttributeRegistry, AttributeTarget};
use crate::info::{TypeInfo, Typed};
use crate::registry::TagTypeRegistry;
use crate::serializers::SerializerFactory;

/// Creates a serializer factory when its assembly is registered.
pub type FactoryConstructor = fn() -> Result<Arc<dyn SerializerFactory>, Box<dyn Error + Send + Sync>>;

// -----------------------------------------------------------------------------
// TagTableEntry

/// A build-time tag mapping shipped with an assembly.
#[derive(Debug, Clone)]
pub struct TagTableEntry {
    pub tag: Cow<'static, str>,
    pub info: &'static TypeInfo,
    pub is_alias: bool,
}

// -----------------------------------------------------------------------------
// Assembly

/// A named unit of types, tag mappings and serializer factories.
///
/// ```
/// use vc_serial::derive::Typed;
/// use vc_serial::registry::Assembly;
/// use vc_serial::settings::SerializerSettings;
///
/// #[derive(Typed, Default)]
/// #[serial(default)]
/// struct Sprite {
///     frame: u32,
/// }
///
/// let assembly = Assembly::new("game")
///     .with_type::<Sprite>()
///     .with_tag::<Sprite>("!sprite", false);
///
/// let settings = SerializerSettings::new();
/// assert!(settings.register_assembly(assembly).newly_registered);
/// assert!(settings.tag_registry().resolve_type("Sprite, game").is_some());
/// ```
pub struct Assembly {
    name: Cow<'static, str>,
    types: Vec<&'static TypeInfo>,
    tag_table: Option<Vec<TagTableEntry>>,
    factories: Vec<FactoryConstructor>,
}

impl Assembly {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            tag_table: None,
            factories: Vec::new(),
        }
    }

    pub fn with_type<T: Typed>(self) -> Self {
        self.with_type_info(T::type_info())
    }

    pub fn with_type_info(mut self, info: &'static TypeInfo) -> Self {
        self.types.push(info);
        self
    }

    /// Adds a tag table entry, creating the table if needed.
    pub fn with_tag<T: Typed>(mut self, tag: impl Into<Cow<'static, str>>, is_alias: bool) -> Self {
        self.tag_table.get_or_insert_default().push(TagTableEntry {
            tag: tag.into(),
            info: T::type_info(),
            is_alias,
        });
        self
    }

    pub fn with_tag_table(mut self, table: Vec<TagTableEntry>) -> Self {
        self.tag_table = Some(table);
        self
    }

    pub fn with_factory(mut self, constructor: FactoryConstructor) -> Self {
        self.factories.push(constructor);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[&'static TypeInfo] {
        &self.types
    }

    pub fn tag_table(&self) -> Option<&[TagTableEntry]> {
        self.tag_table.as_deref()
    }
}

impl fmt::Debug for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembly")
            .field("name", &self.name)
            .field("types", &self.types.len())
            .field("tag_table", &self.tag_table.as_ref().map(Vec::len))
            .field("factories", &self.factories.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Auto registration

/// A type submitted with `#[serial(auto_register)]`.
#[cfg(feature = "auto_register")]
pub struct AutoRegisterType {
    pub crate_name: &'static str,
    pub type_info: fn() -> &'static TypeInfo,
}

/// A factory submitted with [`register_factory!`](crate::register_factory).
#[cfg(feature = "auto_register")]
pub struct AutoRegisterFactory {
    pub crate_name: &'static str,
    pub constructor: FactoryConstructor,
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegisterType);

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegisterFactory);

#[cfg(feature = "auto_register")]
impl Assembly {
    /// Gathers what crate `crate_name` submitted, usually
    /// `Assembly::collect(env!("CARGO_PKG_NAME"))`.
    ///
    /// The tag table is empty: the tags of collected types come from their
    /// `tag` and `tag_alias` attributes, read at registration.
    pub fn collect(crate_name: &'static str) -> Self {
        let mut assembly = Self::new(crate_name).with_tag_table(Vec::new());

        for item in inventory::iter::<AutoRegisterType> {
            if item.crate_name == crate_name {
                assembly.types.push((item.type_info)());
            }
        }
        for item in inventory::iter::<AutoRegisterFactory> {
            if item.crate_name == crate_name {
                assembly.factories.push(item.constructor);
            }
        }
        assembly
    }
}

fn tag_entries(info: &'static TypeInfo, attributes: &[Attribute]) -> impl Iterator<Item = TagTableEntry> {
    attributes.iter().filter_map(move |attribute| match attribute {
        Attribute::Tag(tag) => Some(TagTableEntry {
            tag: tag.clone(),
            info,
            is_alias: false,
        }),
        Attribute::TagAlias(tag) => Some(TagTableEntry {
            tag: tag.clone(),
            info,
            is_alias: true,
        }),
        _ => None,
    })
}

// -----------------------------------------------------------------------------
// Registration

/// Result of [`TagTypeRegistry::register_assembly`].
pub struct AssemblyRegistration {
    /// `false` if an assembly of that name was registered before, in which
    /// case nothing else happened.
    pub newly_registered: bool,
    /// Factories created from the assembly's constructors.
    pub factories: Vec<Arc<dyn SerializerFactory>>,
}

impl fmt::Debug for AssemblyRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyRegistration")
            .field("newly_registered", &self.newly_registered)
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl TagTypeRegistry {
    /// Registers an assembly. Idempotent per assembly name.
    ///
    /// 1. The assembly is appended to the lookup order of type names, with
    ///    its types and their dependencies.
    /// 2. Its tag table is imported, followed by the `Tag` and `TagAlias`
    ///    attributes of its types. Rejected entries are logged and skipped.
    /// 3. Its factory constructors run. A constructor that fails or panics
    ///    is logged and skipped.
    pub fn register_assembly(&self, assembly: Assembly, attributes: &AttributeRegistry) -> AssemblyRegistration {
        {
            let mut state = self.lock();
            if state.has_assembly(&assembly.name) {
                return AssemblyRegistration {
                    newly_registered: false,
                    factories: Vec::new(),
                };
            }
            let slot = state.push_assembly(assembly.name.clone());
            for &info in &assembly.types {
                state.add_type(slot, info);
            }
        }
        log::debug!(
            "registering assembly `{}` with {} types",
            assembly.name,
            assembly.types.len()
        );

        match &assembly.tag_table {
            Some(table) => {
                for entry in table {
                    self.import_tag(&assembly.name, entry);
                }
            }
            None => log::warn!("assembly `{}` has no tag table", assembly.name),
        }
        for &info in &assembly.types {
            self.import_type_tags(&assembly.name, info, attributes);
        }

        let mut factories = Vec::with_capacity(assembly.factories.len());
        for (index, constructor) in assembly.factories.iter().enumerate() {
            match catch_unwind(*constructor) {
                Ok(Ok(factory)) => factories.push(factory),
                Ok(Err(err)) => log::warn!(
                    "assembly `{}`: serializer factory #{index} failed to build: {err}",
                    assembly.name
                ),
                Err(_) => log::warn!(
                    "assembly `{}`: serializer factory #{index} panicked while building",
                    assembly.name
                ),
            }
        }

        AssemblyRegistration {
            newly_registered: true,
            factories,
        }
    }

    /// Imports the `Tag` and `TagAlias` attributes registered on `info`.
    pub(crate) fn import_type_tags(&self, source: &str, info: &'static TypeInfo, attributes: &AttributeRegistry) {
        let resolved = attributes.get_attributes(AttributeTarget::Type(info), false);
        for entry in tag_entries(info, &resolved) {
            self.import_tag(source, &entry);
        }
    }

    fn import_tag(&self, source: &str, entry: &TagTableEntry) {
        if let Err(err) = self.register_tag_mapping(&entry.tag, entry.info, entry.is_alias) {
            log::warn!("`{source}`: skipping tag `{}`: {err}", entry.tag);
        }
    }
}
