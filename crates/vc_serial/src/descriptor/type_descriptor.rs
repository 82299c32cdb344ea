use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use vc_utils::hash::{FixedHashState, HashMap};

use crate::attributes::Attribute;
use crate::descriptor::MemberDescriptor;
use crate::event::DataStyle;
use crate::info::{Type, TypeInfo, TypeKind};

// -----------------------------------------------------------------------------
// DescriptorCategory

/// Which built-in serializer family handles a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorCategory {
    Object,
    Collection,
    Dictionary,
    Primitive,
    Nullable,
    Dynamic,
    Opaque,
}

impl DescriptorCategory {
    pub fn of(kind: &TypeKind) -> Self {
        match kind {
            TypeKind::Object(_) => Self::Object,
            TypeKind::Collection(_) => Self::Collection,
            TypeKind::Dictionary(_) => Self::Dictionary,
            TypeKind::Scalar(_) => Self::Primitive,
            TypeKind::Nullable(_) => Self::Nullable,
            TypeKind::Dynamic(_) => Self::Dynamic,
            TypeKind::Opaque => Self::Opaque,
        }
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Serialization view of a type.
///
/// Immutable once built. Members are stored in serialization order and can
/// be looked up by serialized name or by any alternative name.
pub struct TypeDescriptor {
    info: &'static TypeInfo,
    category: DescriptorCategory,
    members: Box<[MemberDescriptor]>,
    lookup: HashMap<String, usize>,
    style: DataStyle,
    attributes: Arc<[Attribute]>,
}

impl TypeDescriptor {
    /// Builds a descriptor from members already in their final order.
    ///
    /// When two members claim the same name the first one keeps it.
    pub fn new(info: &'static TypeInfo, members: Vec<MemberDescriptor>, attributes: Arc<[Attribute]>) -> Self {
        let mut lookup = HashMap::with_capacity_and_hasher(members.len(), FixedHashState);
        for (index, member) in members.iter().enumerate() {
            let names = core::iter::once(member.name()).chain(member.alternative_names());
            for name in names {
                if lookup.contains_key(name) {
                    log::warn!(
                        "`{}`: member `{}` reuses the name `{name}`, the first member keeps it",
                        info.type_path(),
                        member.original_name(),
                    );
                    continue;
                }
                lookup.insert(String::from(name), index);
            }
        }

        let style = attributes
            .iter()
            .rev()
            .find_map(|attribute| match attribute {
                Attribute::Style(style) => Some(*style),
                _ => None,
            })
            .unwrap_or_default();

        Self {
            info,
            category: DescriptorCategory::of(info.kind()),
            members: members.into_boxed_slice(),
            lookup,
            style,
            attributes,
        }
    }

    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        self.info
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.info.ty()
    }

    #[inline]
    pub fn category(&self) -> DescriptorCategory {
        self.category
    }

    /// Members in serialization order.
    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Finds a member by serialized or alternative name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.lookup.get(name).map(|&index| &self.members[index])
    }

    #[inline]
    pub fn is_compiler_generated(&self) -> bool {
        self.info.is_compiler_generated()
    }

    #[inline]
    pub fn style(&self) -> DataStyle {
        self.style
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.info.type_path())
            .field("category", &self.category)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
