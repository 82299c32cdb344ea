use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::attributes::{Attribute, AttributeRegistry, AttributeRemap, AttributeTarget};
use crate::descriptor::{MemberDescriptor, TypeDescriptor};
use crate::info::{FieldAccess, TypeInfo};

/// Orders members without an explicit `Order`.
pub type MemberComparer = fn(&str, &str) -> Ordering;

// -----------------------------------------------------------------------------
// TypeDescriptorFactory

/// Builds and caches [`TypeDescriptor`]s.
pub trait TypeDescriptorFactory: Send + Sync {
    fn find(&self, info: &'static TypeInfo) -> Arc<TypeDescriptor>;
}

// -----------------------------------------------------------------------------
// DefaultTypeDescriptorFactory

/// The stock descriptor factory.
///
/// - Members of base fields are flattened into the owner, a field of the
///   owner hides a base field of the same name.
/// - Attributes are read through the [`AttributeRegistry`] with inheritance
///   and passed through its remap hook. `Ignore` removes a member.
/// - Members are sorted by explicit order, then by the comparer, then by
///   declaration order. Without a comparer, declaration order decides.
/// - The registry's prepare-members callback runs last.
///
/// ```
/// use std::sync::Arc;
/// use vc_serial::attributes::AttributeRegistry;
/// use vc_serial::derive::Typed;
/// use vc_serial::descriptor::{DefaultTypeDescriptorFactory, TypeDescriptorFactory};
/// use vc_serial::info::Typed as _;
///
/// #[derive(Typed, Default)]
/// #[serial(default)]
/// struct Window {
///     width: u32,
///     height: u32,
///     #[serial(order = -1)]
///     title: String,
/// }
///
/// let factory = DefaultTypeDescriptorFactory::new(Arc::new(AttributeRegistry::new()), Some(str::cmp));
/// let descriptor = factory.find(Window::type_info());
/// let names: Vec<_> = descriptor.members().iter().map(|m| m.name()).collect();
/// assert_eq!(names, ["title", "height", "width"]);
/// ```
pub struct DefaultTypeDescriptorFactory {
    attributes: Arc<AttributeRegistry>,
    comparer: Option<MemberComparer>,
    cache: RwLock<TypeIdMap<Arc<TypeDescriptor>>>,
}

impl DefaultTypeDescriptorFactory {
    pub fn new(attributes: Arc<AttributeRegistry>, comparer: Option<MemberComparer>) -> Self {
        Self {
            attributes,
            comparer,
            cache: RwLock::new(TypeIdMap::new()),
        }
    }

    #[inline]
    pub fn attribute_registry(&self) -> &Arc<AttributeRegistry> {
        &self.attributes
    }

    fn remapped(remap: Option<&AttributeRemap>, attributes: Arc<[Attribute]>) -> Arc<[Attribute]> {
        match remap {
            Some(remap) => attributes.iter().filter_map(|attr| remap(attr)).collect(),
            None => attributes,
        }
    }

    /// Collects the members of `info` and of its base chain.
    fn collect_members(
        &self,
        info: &'static TypeInfo,
        path: &mut Vec<FieldAccess>,
        remap: Option<&AttributeRemap>,
        out: &mut Vec<MemberDescriptor>,
    ) {
        let Some(object) = info.as_object() else {
            return;
        };

        if let Some(base) = object.base() {
            path.push(*base.access());
            self.collect_members(base.type_info(), path, remap, out);
            path.pop();
        }

        for field in object.fields().iter().filter(|field| !field.is_base()) {
            out.retain(|member| member.original_name() != field.name());

            let target = AttributeTarget::Member { owner: info, field };
            let attributes = Self::remapped(remap, self.attributes.get_attributes(target, true));
            if attributes.iter().any(|attr| matches!(attr, Attribute::Ignore)) {
                continue;
            }

            let index = out.len();
            out.push(MemberDescriptor::new(info, field, path, index, attributes));
        }
    }

    fn build(&self, info: &'static TypeInfo) -> TypeDescriptor {
        let remap = self.attributes.attribute_remap();
        let attributes = Self::remapped(
            remap.as_ref(),
            self.attributes.get_attributes(AttributeTarget::Type(info), true),
        );

        let mut members = Vec::new();
        self.collect_members(info, &mut Vec::new(), remap.as_ref(), &mut members);
        // Shadowing can leave gaps.
        members
            .iter_mut()
            .enumerate()
            .for_each(|(index, member)| member.set_declaration_index(index));

        let comparer = self.comparer;
        members.sort_by(|a, b| {
            let explicit = match (a.order(), b.order()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => comparer.map_or(Ordering::Equal, |cmp| cmp(a.name(), b.name())),
            };
            explicit.then(a.declaration_index().cmp(&b.declaration_index()))
        });

        if let Some(prepare) = self.attributes.prepare_members() {
            prepare(info, &mut members);
        }

        TypeDescriptor::new(info, members, attributes)
    }
}

impl TypeDescriptorFactory for DefaultTypeDescriptorFactory {
    fn find(&self, info: &'static TypeInfo) -> Arc<TypeDescriptor> {
        let found = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&info.id())
            .cloned();
        if let Some(found) = found {
            return found;
        }

        // Built outside the lock, attribute hooks may call back into us.
        let descriptor = Arc::new(self.build(info));
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(info.id(), || descriptor)
            .clone()
    }
}

impl fmt::Debug for DefaultTypeDescriptorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultTypeDescriptorFactory")
            .field("sorted", &self.comparer.is_some())
            .finish_non_exhaustive()
    }
}
