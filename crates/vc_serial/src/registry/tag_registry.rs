use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use vc_utils::TypeIdMap;
use vc_utils::hash::{HashMap, HashSet};

use crate::dynamic::DynamicNode;
use crate::error::ConfigurationError;
use crate::info::{TypeInfo, TypeKind, Typed};
use crate::registry::{TypeName, escape_tag, unescape_tag};
use crate::schema::Schema;

/// Name of the assembly holding the built-in types.
pub(crate) const CORE_ASSEMBLY: &str = "core";
/// Name of the assembly collecting types registered one by one.
pub(crate) const HOST_ASSEMBLY: &str = "host";

// -----------------------------------------------------------------------------
// MappedType

/// A tag resolution.
#[derive(Debug, Clone, Copy)]
pub struct MappedType {
    pub info: &'static TypeInfo,
    /// The tag is a synonym, not the canonical tag of `info`.
    pub is_alias: bool,
}

// -----------------------------------------------------------------------------
// State

pub(crate) struct AssemblyEntry {
    pub(crate) name: Cow<'static, str>,
    pub(crate) types: Vec<&'static TypeInfo>,
}

pub(crate) struct TagState {
    tag_to_type: HashMap<String, MappedType>,
    type_to_tag: TypeIdMap<String>,
    /// Tags that failed to resolve.
    unresolved_tags: HashSet<String>,
    /// Type-name resolutions, failures included.
    resolved_names: HashMap<String, Option<&'static TypeInfo>>,
    pub(crate) assemblies: Vec<AssemblyEntry>,
    known: TypeIdMap<&'static TypeInfo>,
}

impl TagState {
    fn invalidate_negative_entries(&mut self) {
        self.unresolved_tags.clear();
        self.resolved_names.retain(|_, found| found.is_some());
    }

    /// Adds `info` and its dependencies to the universe and to assembly
    /// `slot`.
    pub(crate) fn add_type(&mut self, slot: usize, info: &'static TypeInfo) {
        let mut pending = Vec::from([info]);
        while let Some(info) = pending.pop() {
            if self.assemblies[slot].types.iter().any(|known| known.id() == info.id()) {
                continue;
            }
            self.assemblies[slot].types.push(info);
            self.known.insert(info.id(), info);
            pending.extend(info.dependencies());
        }
        self.invalidate_negative_entries();
    }

    fn assembly_slot(&mut self, name: &str) -> usize {
        match self.assemblies.iter().position(|entry| entry.name == name) {
            Some(slot) => slot,
            None => {
                self.assemblies.push(AssemblyEntry {
                    name: Cow::Owned(name.into()),
                    types: Vec::new(),
                });
                self.assemblies.len() - 1
            }
        }
    }

    pub(crate) fn has_assembly(&self, name: &str) -> bool {
        self.assemblies.iter().any(|entry| entry.name == name)
    }

    pub(crate) fn push_assembly(&mut self, name: Cow<'static, str>) -> usize {
        self.assemblies.push(AssemblyEntry {
            name,
            types: Vec::new(),
        });
        self.assemblies.len() - 1
    }

    fn resolve_name(&mut self, text: &str) -> Option<&'static TypeInfo> {
        if let Some(found) = self.resolved_names.get(text) {
            return *found;
        }

        let found = match TypeName::parse(text) {
            Ok(name) => self.resolve_parsed(&name, name.hint.as_deref()),
            Err(err) => {
                log::trace!("unparsable type name `{text}`: {err}");
                None
            }
        };
        self.resolved_names.insert(text.into(), found);
        found
    }

    fn resolve_parsed(&self, name: &TypeName, hint: Option<&str>) -> Option<&'static TypeInfo> {
        let mut args = Vec::with_capacity(name.args.len());
        for arg in &name.args {
            args.push(self.resolve_parsed(arg, None)?.id());
        }

        let mut current = self.find_outer(&name.name, &args, hint)?;
        for _ in 0..name.array_rank {
            current = self.array_of(current)?;
        }
        Some(current)
    }

    /// First assembly in registration order that matches `hint` and
    /// contains the name.
    fn find_outer(&self, name: &str, args: &[TypeId], hint: Option<&str>) -> Option<&'static TypeInfo> {
        let assemblies = self
            .assemblies
            .iter()
            .filter(|entry| hint.is_none_or(|hint| entry.name == hint));

        for entry in assemblies {
            let found = if args.is_empty() {
                Self::find_simple(entry, name)
            } else {
                Self::find_generic(entry, name, args)
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn find_simple(entry: &AssemblyEntry, name: &str) -> Option<&'static TypeInfo> {
        let simple = || entry.types.iter().copied().filter(|info| info.generic().is_none());
        if let Some(found) = simple().find(|info| info.type_path() == name) {
            return Some(found);
        }
        unique(simple().filter(|info| info.type_name() == name || info.type_ident() == name))
    }

    fn find_generic(entry: &AssemblyEntry, name: &str, args: &[TypeId]) -> Option<&'static TypeInfo> {
        let with_args = || {
            entry.types.iter().copied().filter(|info| {
                info.generic()
                    .is_some_and(|generic| generic.args().iter().map(|arg| arg.id()).eq(args.iter().copied()))
            })
        };
        if let Some(found) = with_args().find(|info| info.generic().is_some_and(|g| g.definition() == name)) {
            return Some(found);
        }
        unique(with_args().filter(|info| info.generic().is_some_and(|g| g.ident() == name)))
    }

    fn array_of(&self, item: &'static TypeInfo) -> Option<&'static TypeInfo> {
        self.known.values().copied().find(|info| match info.kind() {
            TypeKind::Collection(list) => list.is_array() && list.item().id() == item.id(),
            _ => false,
        })
    }
}

fn unique(mut found: impl Iterator<Item = &'static TypeInfo>) -> Option<&'static TypeInfo> {
    let first = found.next()?;
    found.next().is_none().then_some(first)
}

// -----------------------------------------------------------------------------
// TagTypeRegistry

/// Bidirectional, alias-aware mapping between tags and types.
///
/// - Every type has one canonical tag: registered, taken from the schema,
///   or synthesized as `!` followed by its type path.
/// - Alias tags resolve to a type without being its canonical tag.
/// - Schema tags always win over registrations.
///
/// ```
/// use std::sync::Arc;
/// use vc_serial::derive::Typed;
/// use vc_serial::info::Typed as _;
/// use vc_serial::registry::TagTypeRegistry;
/// use vc_serial::schema::CoreSchema;
///
/// #[derive(Typed, Default)]
/// #[serial(default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let registry = TagTypeRegistry::new(Arc::new(CoreSchema));
/// registry.register_tag_mapping("!!Point", Point::type_info(), false).unwrap();
/// registry.register_tag_mapping("!Vector2", Point::type_info(), true).unwrap();
///
/// assert_eq!(registry.tag_from_type(Point::type_info()), "!!Point");
/// assert!(registry.type_from_tag("!Vector2").unwrap().is_alias);
/// ```
pub struct TagTypeRegistry {
    schema: Arc<dyn Schema>,
    state: Mutex<TagState>,
}

impl TagTypeRegistry {
    /// A registry whose `core` assembly holds the built-in scalar types.
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        let mut state = TagState {
            tag_to_type: HashMap::default(),
            type_to_tag: TypeIdMap::new(),
            unresolved_tags: HashSet::default(),
            resolved_names: HashMap::default(),
            assemblies: Vec::new(),
            known: TypeIdMap::new(),
        };

        let core = state.push_assembly(Cow::Borrowed(CORE_ASSEMBLY));
        let builtin = [
            <()>::type_info(),
            bool::type_info(),
            char::type_info(),
            i8::type_info(),
            i16::type_info(),
            i32::type_info(),
            i64::type_info(),
            i128::type_info(),
            isize::type_info(),
            u8::type_info(),
            u16::type_info(),
            u32::type_info(),
            u64::type_info(),
            u128::type_info(),
            usize::type_info(),
            f32::type_info(),
            f64::type_info(),
            String::type_info(),
            <Vec<u8>>::type_info(),
            DynamicNode::type_info(),
            <alloc::boxed::Box<dyn core::any::Any>>::type_info(),
        ];
        for info in builtin {
            state.add_type(core, info);
        }
        state.push_assembly(Cow::Borrowed(HOST_ASSEMBLY));

        Self {
            schema,
            state: Mutex::new(state),
        }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<dyn Schema> {
        &self.schema
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, TagState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maps `tag` to `info`.
    ///
    /// A canonical registration replaces the previous canonical tag of
    /// `info`, which stays readable as an alias. An alias registration
    /// never touches the canonical tag.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::EmptyTag`].
    /// - [`ConfigurationError::AliasOverCanonical`] when `tag` is already
    ///   the canonical tag of a type.
    pub fn register_tag_mapping(
        &self,
        tag: &str,
        info: &'static TypeInfo,
        is_alias: bool,
    ) -> Result<(), ConfigurationError> {
        if tag.is_empty() {
            return Err(ConfigurationError::EmptyTag);
        }
        let tag = unescape_tag(tag).into_owned();
        let mut state = self.lock();

        if is_alias {
            if let Some(existing) = state.tag_to_type.get(&tag)
                && !existing.is_alias
            {
                return Err(ConfigurationError::AliasOverCanonical {
                    tag,
                    existing: existing.info.type_path(),
                });
            }
        } else {
            if let Some(previous) = state.type_to_tag.insert(info.id(), tag.clone())
                && previous != tag
                && let Some(entry) = state.tag_to_type.get_mut(&previous)
            {
                entry.is_alias = true;
            }
            // The tag may have been the canonical tag of another type.
            if let Some(displaced) = state.tag_to_type.get(&tag).copied()
                && displaced.info.id() != info.id()
                && state.type_to_tag.get(&displaced.info.id()) == Some(&tag)
            {
                state.type_to_tag.remove(&displaced.info.id());
            }
        }

        log::trace!("tag `{tag}` -> `{}` (alias: {is_alias})", info.type_path());
        state.tag_to_type.insert(tag, MappedType { info, is_alias });
        state.known.insert(info.id(), info);
        state.invalidate_negative_entries();
        Ok(())
    }

    /// Resolves a tag.
    ///
    /// 1. Schema default tags resolve to the schema type.
    /// 2. Registered tags, after percent-decoding.
    /// 3. The tag without its `!` or `!!` marker, as a type name.
    ///
    /// Results of the third step are memoized, failures included, until
    /// the next registration.
    pub fn type_from_tag(&self, tag: &str) -> Option<MappedType> {
        let short = self.schema.shorten_tag(tag);
        if let Some(info) = self.schema.type_for_default_tag(&short) {
            return Some(MappedType { info, is_alias: false });
        }

        let decoded = unescape_tag(&short);
        let mut state = self.lock();
        if let Some(found) = state.tag_to_type.get(&*decoded) {
            return Some(*found);
        }
        if state.unresolved_tags.contains(&*decoded) {
            return None;
        }

        let name = decoded
            .strip_prefix("!!")
            .or_else(|| decoded.strip_prefix('!'))
            .unwrap_or(&*decoded);
        match state.resolve_name(name) {
            Some(info) => {
                log::trace!("tag `{decoded}` resolved by name to `{}`", info.type_path());
                let mapped = MappedType { info, is_alias: false };
                state.tag_to_type.insert(decoded.into_owned(), mapped);
                Some(mapped)
            }
            None => {
                log::trace!("tag `{decoded}` does not resolve");
                state.unresolved_tags.insert(decoded.into_owned());
                None
            }
        }
    }

    /// The canonical tag of `info`, percent-escaped.
    pub fn tag_from_type(&self, info: &'static TypeInfo) -> String {
        let mut state = self.lock();
        if let Some(tag) = state.type_to_tag.get(&info.id()) {
            return escape_tag(tag).into_owned();
        }

        let tag = match self.schema.default_tag(info.id()) {
            Some(tag) => String::from(tag),
            None => format!("!{}", info.type_path()),
        };
        let escaped = escape_tag(&tag).into_owned();
        state.type_to_tag.insert(info.id(), tag);
        if !state.known.contains(&info.id()) {
            let host = state.assembly_slot(HOST_ASSEMBLY);
            state.add_type(host, info);
        }
        escaped
    }

    /// Resolves a type name, see [`TypeName`].
    pub fn resolve_type(&self, full_name: &str) -> Option<&'static TypeInfo> {
        self.lock().resolve_name(full_name.trim())
    }

    /// Adds `info` and its dependencies to the `host` assembly.
    ///
    /// Tags are not imported, see
    /// [`SerializerSettings::register_type`](crate::settings::SerializerSettings::register_type).
    pub fn register_type(&self, info: &'static TypeInfo) {
        let mut state = self.lock();
        let host = state.assembly_slot(HOST_ASSEMBLY);
        state.add_type(host, info);
    }

    /// A registered type by id, used to find the runtime type of a value.
    pub fn type_info_by_id(&self, id: TypeId) -> Option<&'static TypeInfo> {
        self.lock().known.get(&id).copied()
    }

    /// Names of the registered assemblies, in lookup order.
    pub fn assembly_names(&self) -> Vec<String> {
        self.lock()
            .assemblies
            .iter()
            .map(|entry| String::from(&*entry.name))
            .collect()
    }
}

impl fmt::Debug for TagTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("TagTypeRegistry")
            .field("tags", &state.tag_to_type.len())
            .field("types", &state.known.len())
            .field("assemblies", &state.assemblies.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use super::*;
    use crate::info::TypePath;
    use crate::schema::CoreSchema;

    fn registry() -> TagTypeRegistry {
        TagTypeRegistry::new(Arc::new(CoreSchema))
    }

    #[test]
    fn schema_tags_win() {
        let registry = registry();
        registry.register_tag_mapping("!!int", u8::type_info(), false).unwrap();
        let mapped = registry.type_from_tag("tag:yaml.org,2002:int").unwrap();
        assert_eq!(mapped.info.type_path(), "i64");
    }

    #[test]
    fn tag_stability() {
        let registry = registry();
        registry.register_tag_mapping("!counter", u16::type_info(), false).unwrap();
        for _ in 0..2 {
            assert_eq!(registry.tag_from_type(u16::type_info()), "!counter");
            let mapped = registry.type_from_tag("!counter").unwrap();
            assert_eq!(mapped.info.id(), TypeId::of::<u16>());
            assert!(!mapped.is_alias);
        }
    }

    #[test]
    fn canonical_reregistration_demotes_the_old_tag() {
        let registry = registry();
        registry.register_tag_mapping("!old", u16::type_info(), false).unwrap();
        registry.register_tag_mapping("!new", u16::type_info(), false).unwrap();

        assert_eq!(registry.tag_from_type(u16::type_info()), "!new");
        assert!(registry.type_from_tag("!old").unwrap().is_alias);
    }

    #[test]
    fn alias_rules() {
        let registry = registry();
        assert!(matches!(
            registry.register_tag_mapping("", u16::type_info(), true),
            Err(ConfigurationError::EmptyTag)
        ));

        registry.register_tag_mapping("!a", u16::type_info(), false).unwrap();
        assert!(matches!(
            registry.register_tag_mapping("!a", u32::type_info(), true),
            Err(ConfigurationError::AliasOverCanonical { .. })
        ));

        registry.register_tag_mapping("!b", u16::type_info(), true).unwrap();
        assert_eq!(registry.tag_from_type(u16::type_info()), "!a");
    }

    #[test]
    fn synthesized_tags() {
        let registry = registry();
        type Map = BTreeMap<String, u8>;
        let tag = registry.tag_from_type(Map::type_info());
        assert_eq!(tag, "!alloc::collections::BTreeMap[String,u8]");
        assert_eq!(registry.type_from_tag(&tag).unwrap().info.id(), TypeId::of::<Map>());
        assert_eq!(registry.tag_from_type(i16::type_info()), "!!int");
    }

    #[test]
    fn type_names() {
        let registry = registry();
        assert_eq!(registry.resolve_type("u8").map(TypeInfo::type_path), Some("u8"));
        assert_eq!(registry.resolve_type("u8[]").map(TypeInfo::type_path), Some("u8[]"));
        assert_eq!(registry.resolve_type("u8, core").map(TypeInfo::type_path), Some("u8"));
        assert!(registry.resolve_type("u8, host").is_none());
        assert!(registry.resolve_type("u8[][]").is_none());

        registry.register_type(<Vec<Vec<u8>>>::type_info());
        assert_eq!(
            registry.resolve_type("u8[][]").map(TypeInfo::type_path),
            Some("u8[][]")
        );
    }

    #[test]
    fn generic_names() {
        let registry = registry();
        type Map = BTreeMap<String, u8>;
        assert!(registry.resolve_type("BTreeMap[String,u8]").is_none());

        registry.register_type(Map::type_info());
        for name in ["BTreeMap[String,u8]", "alloc::collections::BTreeMap[String,u8]"] {
            assert_eq!(registry.resolve_type(name).map(TypeInfo::id), Some(TypeId::of::<Map>()));
        }
        assert!(registry.resolve_type("BTreeMap[String,u16]").is_none());
        assert!(registry.resolve_type("BTreeMap[Missing,u8]").is_none());
    }

    #[test]
    fn negative_entries_are_invalidated() {
        let registry = registry();
        assert!(registry.type_from_tag("!u16[]").is_none());

        registry.register_type(<Vec<u16>>::type_info());
        let mapped = registry.type_from_tag("!u16[]").unwrap();
        assert_eq!(mapped.info.type_path(), <Vec<u16>>::type_path());
    }
}
