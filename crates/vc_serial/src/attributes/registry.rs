use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use std::sync::{Mutex, PoisonError, RwLock};

use vc_utils::hash::HashMap;

use crate::attributes::Attribute;
use crate::descriptor::MemberDescriptor;
use crate::info::{FieldInfo, TypeInfo, Typed};

/// Post-processing hook applied to every attribute read by the descriptor
/// factory. Returning `None` drops the attribute.
pub type AttributeRemap = Arc<dyn Fn(&Attribute) -> Option<Attribute> + Send + Sync>;

/// Called by the descriptor factory once the members of a type are known,
/// to add, remove or reorder them.
pub type PrepareMembersCallback = Arc<dyn Fn(&'static TypeInfo, &mut Vec<MemberDescriptor>) + Send + Sync>;

// -----------------------------------------------------------------------------
// AttributeTarget

/// A type or one of its members.
#[derive(Clone, Copy)]
pub enum AttributeTarget {
    Type(&'static TypeInfo),
    Member {
        owner: &'static TypeInfo,
        field: &'static FieldInfo,
    },
}

impl AttributeTarget {
    #[inline]
    pub fn of_type<T: Typed>() -> Self {
        Self::Type(T::type_info())
    }

    /// The field `name` declared by `T` itself.
    pub fn member<T: Typed>(name: &str) -> Option<Self> {
        Self::member_of(T::type_info(), name)
    }

    pub fn member_of(owner: &'static TypeInfo, name: &str) -> Option<Self> {
        let field = owner.as_object()?.field(name)?;
        Some(Self::Member { owner, field })
    }

    fn key(&self) -> TargetKey {
        match *self {
            Self::Type(info) => TargetKey {
                owner: info.id(),
                member: None,
            },
            Self::Member { owner, field } => TargetKey {
                owner: owner.id(),
                member: Some(field.name()),
            },
        }
    }

    fn declared(&self) -> &'static [Attribute] {
        match *self {
            Self::Type(info) => info.attributes(),
            Self::Member { field, .. } => field.attributes(),
        }
    }

    /// The same target one step up the base chain.
    fn parent(&self) -> Option<Self> {
        match *self {
            Self::Type(info) => {
                let base = info.as_object()?.base()?;
                Some(Self::Type(base.type_info()))
            }
            Self::Member { owner, field } => {
                if field.is_base() {
                    return None;
                }
                let mut current = owner;
                loop {
                    current = current.as_object()?.base()?.type_info();
                    if let Some(found) = current.as_object().and_then(|o| o.field(field.name()))
                        && !found.is_base()
                    {
                        return Some(Self::Member {
                            owner: current,
                            field: found,
                        });
                    }
                }
            }
        }
    }
}

impl fmt::Debug for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(info) => f.debug_tuple("Type").field(&info.type_path()).finish(),
            Self::Member { owner, field } => f
                .debug_struct("Member")
                .field("owner", &owner.type_path())
                .field("field", &field.name())
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TargetKey {
    owner: TypeId,
    member: Option<&'static str>,
}

// -----------------------------------------------------------------------------
// AttributeRegistry

#[derive(Default)]
struct AttributeState {
    cache: HashMap<(TargetKey, bool), Arc<[Attribute]>>,
    registered: HashMap<TargetKey, Vec<Attribute>>,
}

/// Resolves and caches the attributes of types and members.
///
/// A lookup merges, in this order:
/// 1. the attributes of the base chain, when `inherit` is set,
/// 2. the declared attributes,
/// 3. the attributes added with [`register`](Self::register).
///
/// Results are memoized per `(target, inherit)` and never evicted.
///
/// # Ordering
///
/// Register attributes before the first lookup that reaches them through
/// the base chain of another type. `register` refreshes the cached entries
/// of its own target, not the inherited entries computed earlier for
/// derived types.
///
/// ```
/// use vc_serial::attributes::{Attribute, AttributeRegistry, AttributeTarget};
/// use vc_serial::derive::Typed;
///
/// #[derive(Typed, Default)]
/// #[serial(default)]
/// struct Config {
///     #[serial(rename = "level")]
///     verbosity: u8,
/// }
///
/// let registry = AttributeRegistry::new();
/// let target = AttributeTarget::member::<Config>("verbosity").unwrap();
///
/// registry.register(target, Attribute::Order(3));
/// let attributes = registry.get_attributes(target, true);
/// assert_eq!(attributes.len(), 2);
/// assert_eq!(attributes[1], Attribute::Order(3));
/// ```
pub struct AttributeRegistry {
    state: Mutex<AttributeState>,
    remap: RwLock<Option<AttributeRemap>>,
    prepare_members: RwLock<Option<PrepareMembersCallback>>,
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AttributeState::default()),
            remap: RwLock::new(None),
            prepare_members: RwLock::new(None),
        }
    }

    /// The merged attributes of `target`.
    pub fn get_attributes(&self, target: AttributeTarget, inherit: bool) -> Arc<[Attribute]> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Self::resolve(&mut state, target, inherit)
    }

    fn resolve(state: &mut AttributeState, target: AttributeTarget, inherit: bool) -> Arc<[Attribute]> {
        let key = target.key();
        if let Some(found) = state.cache.get(&(key, inherit)) {
            return found.clone();
        }

        let mut list = Vec::new();
        if inherit && let Some(parent) = target.parent() {
            list.extend(Self::resolve(state, parent, true).iter().cloned());
        }
        list.extend(target.declared().iter().cloned());
        if let Some(registered) = state.registered.get(&key) {
            list.extend(registered.iter().cloned());
        }

        let list: Arc<[Attribute]> = list.into();
        state.cache.insert((key, inherit), list.clone());
        list
    }

    /// Adds an attribute to `target`.
    ///
    /// Registrations are append-only. Cached lists of `target` are replaced
    /// by lists including `attribute`; lists handed out earlier keep their
    /// contents.
    pub fn register(&self, target: AttributeTarget, attribute: Attribute) {
        let key = target.key();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        for inherit in [false, true] {
            if let Some(cached) = state.cache.get_mut(&(key, inherit)) {
                let mut list = cached.to_vec();
                list.push(attribute.clone());
                *cached = list.into();
            }
        }
        state.registered.entry(key).or_default().push(attribute);
    }

    pub fn set_attribute_remap(
        &self,
        remap: impl Fn(&Attribute) -> Option<Attribute> + Send + Sync + 'static,
    ) {
        *self.remap.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(remap));
    }

    pub fn attribute_remap(&self) -> Option<AttributeRemap> {
        self.remap.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_prepare_members(
        &self,
        callback: impl Fn(&'static TypeInfo, &mut Vec<MemberDescriptor>) + Send + Sync + 'static,
    ) {
        *self.prepare_members.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    pub fn prepare_members(&self) -> Option<PrepareMembersCallback> {
        self.prepare_members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AttributeRegistry")
            .field("cached", &state.cache.len())
            .field("registered", &state.registered.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::any::Any;

    use super::*;
    use crate::info::{FieldAccess, FieldFlags, NonGenericTypeInfoCell, ObjectInfo};
    use crate::info::{TypeKind, TypePath};

    struct Base {
        id: u32,
    }

    struct Derived {
        base: Base,
        id: u32,
    }

    impl TypePath for Base {
        fn type_path() -> &'static str {
            "tests::Base"
        }
        fn type_name() -> &'static str {
            "Base"
        }
        fn type_ident() -> &'static str {
            "Base"
        }
    }

    impl Typed for Base {
        fn type_info() -> &'static TypeInfo {
            static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| {
                let id = FieldInfo::new::<u32>(
                    "id",
                    0,
                    FieldAccess {
                        get: |v| v.downcast_ref::<Base>().map(|v| &v.id as &dyn Any),
                        get_mut: |v| v.downcast_mut::<Base>().map(|v| &mut v.id as &mut dyn Any),
                        set: None,
                    },
                )
                .with_attributes(vec![Attribute::Order(1)]);
                TypeInfo::new::<Self>(TypeKind::Object(ObjectInfo::new(vec![id])))
                    .with_attributes(vec![Attribute::Tag("!base".into())])
            })
        }
    }

    impl TypePath for Derived {
        fn type_path() -> &'static str {
            "tests::Derived"
        }
        fn type_name() -> &'static str {
            "Derived"
        }
        fn type_ident() -> &'static str {
            "Derived"
        }
    }

    impl Typed for Derived {
        fn type_info() -> &'static TypeInfo {
            static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
            CELL.get_or_init(|| {
                let base = FieldInfo::new::<Base>(
                    "base",
                    0,
                    FieldAccess {
                        get: |v| v.downcast_ref::<Derived>().map(|v| &v.base as &dyn Any),
                        get_mut: |v| v.downcast_mut::<Derived>().map(|v| &mut v.base as &mut dyn Any),
                        set: None,
                    },
                )
                .with_flags(FieldFlags::BASE);
                let id = FieldInfo::new::<u32>(
                    "id",
                    1,
                    FieldAccess {
                        get: |v| v.downcast_ref::<Derived>().map(|v| &v.id as &dyn Any),
                        get_mut: |v| v.downcast_mut::<Derived>().map(|v| &mut v.id as &mut dyn Any),
                        set: None,
                    },
                )
                .with_attributes(vec![Attribute::Rename("key".into())]);
                TypeInfo::new::<Self>(TypeKind::Object(ObjectInfo::new(vec![base, id])))
            })
        }
    }

    #[test]
    fn inherit_walks_the_base_chain() {
        let registry = AttributeRegistry::new();
        let target = AttributeTarget::member::<Derived>("id").unwrap();

        let own = registry.get_attributes(target, false);
        assert_eq!(&*own, &[Attribute::Rename("key".into())]);

        let inherited = registry.get_attributes(target, true);
        assert_eq!(
            &*inherited,
            &[Attribute::Order(1), Attribute::Rename("key".into())]
        );

        let ty = registry.get_attributes(AttributeTarget::of_type::<Derived>(), true);
        assert_eq!(&*ty, &[Attribute::Tag("!base".into())]);
    }

    #[test]
    fn lookups_are_memoized() {
        let registry = AttributeRegistry::new();
        let target = AttributeTarget::of_type::<Base>();
        let first = registry.get_attributes(target, true);
        let second = registry.get_attributes(target, true);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn register_is_monotonic() {
        let registry = AttributeRegistry::new();
        let target = AttributeTarget::member::<Base>("id").unwrap();

        // Queued before the first lookup.
        registry.register(target, Attribute::Mask(2));
        let before = registry.get_attributes(target, false);
        assert_eq!(before.len(), 2);

        // Applied to the cached entries.
        registry.register(target, Attribute::Mask(4));
        for inherit in [false, true] {
            let after = registry.get_attributes(target, inherit);
            assert_eq!(after.len(), 3);
            assert!(after.contains(&Attribute::Mask(2)));
            assert!(after.contains(&Attribute::Mask(4)));
        }
        assert_eq!(before.len(), 2);
    }

    #[test]
    fn hooks_are_stored() {
        let registry = AttributeRegistry::new();
        assert!(registry.attribute_remap().is_none());

        registry.set_attribute_remap(|attr| match attr {
            Attribute::Mask(_) => None,
            other => Some(other.clone()),
        });
        let remap = registry.attribute_remap().unwrap();
        assert_eq!(remap(&Attribute::Mask(1)), None);
        assert_eq!(remap(&Attribute::Order(1)), Some(Attribute::Order(1)));
    }
}
