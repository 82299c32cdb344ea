use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::attributes::Attribute;
use crate::descriptor::SerializeMode;
use crate::event::DataStyle;
use crate::info::{FieldAccess, FieldFlags, FieldInfo, Type, TypeInfo};

// -----------------------------------------------------------------------------
// MemberDescriptor

/// Serialization view of one member.
///
/// Members inherited through base fields are reached through a chain of
/// accessors starting at the outermost owner.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: Cow<'static, str>,
    original_name: &'static str,
    alternative_names: Vec<Cow<'static, str>>,
    ty: Type,
    type_info: fn() -> &'static TypeInfo,
    declaring_type: &'static TypeInfo,
    order: Option<i32>,
    declaration_index: usize,
    mode: SerializeMode,
    mask: u32,
    style: DataStyle,
    should_serialize: Option<fn(&dyn Any) -> bool>,
    flags: FieldFlags,
    tag: Option<Cow<'static, str>>,
    path: Box<[FieldAccess]>,
    attributes: Arc<[Attribute]>,
}

impl MemberDescriptor {
    /// Builds the descriptor of `field`, declared by `declaring_type`.
    ///
    /// - `path`: accessors leading from the outermost owner to `declaring_type`.
    /// - `attributes`: the resolved attributes, the last one of each kind wins.
    pub fn new(
        declaring_type: &'static TypeInfo,
        field: &'static FieldInfo,
        path: &[FieldAccess],
        declaration_index: usize,
        attributes: Arc<[Attribute]>,
    ) -> Self {
        let mut member = Self {
            name: Cow::Borrowed(field.name()),
            original_name: field.name(),
            alternative_names: Vec::new(),
            ty: field.ty(),
            type_info: field.type_info_fn(),
            declaring_type,
            order: None,
            declaration_index,
            mode: SerializeMode::Default,
            mask: 1,
            style: DataStyle::Any,
            should_serialize: None,
            flags: field.flags(),
            tag: None,
            path: path.iter().copied().chain([*field.access()]).collect(),
            attributes: Arc::from([]),
        };

        for attribute in attributes.iter() {
            match attribute {
                Attribute::Rename(name) => member.name = name.clone(),
                Attribute::Alias(name) => member.alternative_names.push(name.clone()),
                Attribute::Order(order) => member.order = Some(*order),
                Attribute::Mode(mode) => member.mode = *mode,
                Attribute::Mask(mask) => member.mask = *mask,
                Attribute::Style(style) => member.style = *style,
                Attribute::Tag(tag) => member.tag = Some(tag.clone()),
                Attribute::ShouldSerialize(predicate) => member.should_serialize = Some(*predicate),
                Attribute::Ignore | Attribute::TagAlias(_) | Attribute::Custom(_) => {}
            }
        }
        member.attributes = attributes;
        member
    }

    /// Serialized name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the Rust field.
    #[inline]
    pub fn original_name(&self) -> &'static str {
        self.original_name
    }

    /// Extra names accepted on read.
    pub fn alternative_names(&self) -> impl Iterator<Item = &str> {
        self.alternative_names.iter().map(|name| &**name)
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    /// The type declaring the field, a base type for flattened members.
    #[inline]
    pub fn declaring_type(&self) -> &'static TypeInfo {
        self.declaring_type
    }

    #[inline]
    pub fn order(&self) -> Option<i32> {
        self.order
    }

    #[inline]
    pub fn declaration_index(&self) -> usize {
        self.declaration_index
    }

    /// The declared mode, see [`effective_mode`](Self::effective_mode).
    #[inline]
    pub fn mode(&self) -> SerializeMode {
        self.mode
    }

    /// The mode with [`SerializeMode::Default`] resolved.
    pub fn effective_mode(&self) -> SerializeMode {
        match self.mode {
            SerializeMode::Default if self.has_setter() => SerializeMode::Assign,
            SerializeMode::Default => SerializeMode::Content,
            mode => mode,
        }
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    #[inline]
    pub fn style(&self) -> DataStyle {
        self.style
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(FieldFlags::PUBLIC)
    }

    pub fn has_setter(&self) -> bool {
        self.path.last().is_some_and(|access| access.set.is_some())
    }

    /// Tag written in place of the member type's own tag.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Every attribute the member was built from.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Whether the member takes part in a pass with `mask`.
    #[inline]
    pub fn is_transferable(&self, mask: u32) -> bool {
        self.mode != SerializeMode::Never && self.mask & mask != 0
    }

    /// Whether `value` should be written, `true` without a predicate.
    pub fn should_serialize(&self, value: &dyn Any) -> bool {
        self.should_serialize.is_none_or(|predicate| predicate(value))
    }

    /// The member value inside `owner`.
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        self.path.iter().try_fold(owner, |current, access| (access.get)(current))
    }

    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        self.path
            .iter()
            .try_fold(owner, |current, access| (access.get_mut)(current))
    }

    /// Replaces the member value. Returns `false` without a setter or on a
    /// type mismatch.
    pub fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> bool {
        let Some((last, parents)) = self.path.split_last() else {
            return false;
        };
        let Some(setter) = last.set else {
            return false;
        };
        match parents
            .iter()
            .try_fold(owner, |current, access| (access.get_mut)(current))
        {
            Some(declaring) => setter(declaring, value),
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Adjustments, for `PrepareMembersCallback`s.

    pub fn set_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.name = name.into();
    }

    pub fn add_alternative_name(&mut self, name: impl Into<Cow<'static, str>>) {
        self.alternative_names.push(name.into());
    }

    pub fn set_order(&mut self, order: Option<i32>) {
        self.order = order;
    }

    pub fn set_mode(&mut self, mode: SerializeMode) {
        self.mode = mode;
    }

    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
    }

    pub fn set_style(&mut self, style: DataStyle) {
        self.style = style;
    }

    pub(crate) fn set_declaration_index(&mut self, index: usize) {
        self.declaration_index = index;
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("original_name", &self.original_name)
            .field("ty", &self.ty)
            .field("order", &self.order)
            .field("mode", &self.mode)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
