//! Per-element transfer policy used by the built-in serializers.
//!
//! Serializers walk the structure of a value and call exactly one backend
//! method per member, item or pair. Replacing the backend changes naming,
//! styling or filtering without touching the serializers.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use crate::binary;
use crate::context::{ObjectContext, ReadOutcome, SerializerContext};
use crate::descriptor::{MemberDescriptor, SerializeMode};
use crate::error::{ConfigurationError, FormatError, SerialError};
use crate::event::{DataStyle, Event, EventReaderExt, ScalarEvent};
use crate::info::{BinaryLayout, CollectionInfo, TypeInfo};
use crate::schema::CoreSchema;

// -----------------------------------------------------------------------------
// MemberName

/// A member key as understood by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    /// Name to look up in the type descriptor.
    pub name: String,
    /// Skip the value without looking the member up.
    pub skip: bool,
}

impl MemberName {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip: false,
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectSerializerBackend

/// Transfer policy of the built-in serializers.
///
/// Every method has a default, [`DefaultObjectSerializerBackend`] overrides
/// none of them.
pub trait ObjectSerializerBackend: Send + Sync {
    /// The style of the node about to be written: the one requested by the
    /// caller, then the one of the type, then the default of the settings.
    fn style(&self, cx: &ObjectContext<'_, '_>) -> DataStyle {
        [cx.style(), cx.descriptor().style()]
            .into_iter()
            .find(|style| *style != DataStyle::Any)
            .unwrap_or(cx.settings().options().default_style)
    }

    fn read_member_name(
        &self,
        _cx: &mut ObjectContext<'_, '_>,
        raw: &str,
    ) -> Result<MemberName, SerialError> {
        Ok(MemberName::new(raw))
    }

    fn write_member_name(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        member: &MemberDescriptor,
    ) -> Result<(), SerialError> {
        cx.context().emit(Event::Scalar(ScalarEvent::plain(member.name())))
    }

    /// Reads the value of `member` into `owner`, following its
    /// [`SerializeMode`].
    fn read_member_value(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        member: &MemberDescriptor,
        owner: &mut dyn Any,
    ) -> Result<(), SerialError> {
        let info = member.type_info();
        match member.effective_mode() {
            SerializeMode::Binary => read_binary(cx.context(), member, owner),
            SerializeMode::Content => {
                let Some(slot) = member.get_mut(owner) else {
                    return Err(inaccessible(member));
                };
                match cx.context().read_tagged(Some(slot), Some(info), member.tag())? {
                    ReadOutcome::Merged => Ok(()),
                    ReadOutcome::Value(value) => assign(member, owner, value),
                }
            }
            _ => {
                let value = cx.context().read_tagged(None, Some(info), member.tag())?.into_value()?;
                assign(member, owner, value)
            }
        }
    }

    fn write_member_value(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        member: &MemberDescriptor,
        value: &dyn Any,
    ) -> Result<(), SerialError> {
        match member.effective_mode() {
            SerializeMode::Binary => write_binary(cx.context(), member, value),
            _ => cx
                .context()
                .write_tagged(value, Some(member.type_info()), member.style(), member.tag()),
        }
    }

    fn read_collection_item(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        item: &'static TypeInfo,
    ) -> Result<Box<dyn Any>, SerialError> {
        cx.context().read_yaml(None, Some(item))?.into_value()
    }

    fn write_collection_item(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        value: &dyn Any,
        item: &'static TypeInfo,
    ) -> Result<(), SerialError> {
        cx.context().write_yaml(value, Some(item), DataStyle::Any)
    }

    /// Reads a key, then its value.
    fn read_dictionary_item(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        key: &'static TypeInfo,
        value: &'static TypeInfo,
    ) -> Result<(Box<dyn Any>, Box<dyn Any>), SerialError> {
        let key = cx.context().read_yaml(None, Some(key))?.into_value()?;
        let value = cx.context().read_yaml(None, Some(value))?.into_value()?;
        Ok((key, value))
    }

    fn write_dictionary_item(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        pair: (&dyn Any, &dyn Any),
        key: &'static TypeInfo,
        value: &'static TypeInfo,
    ) -> Result<(), SerialError> {
        cx.context().write_yaml(pair.0, Some(key), DataStyle::Any)?;
        cx.context().write_yaml(pair.1, Some(value), DataStyle::Any)
    }

    /// Whether `value`, the current value of `member`, is written at all.
    fn should_write_member(
        &self,
        _cx: &ObjectContext<'_, '_>,
        member: &MemberDescriptor,
        value: &dyn Any,
    ) -> bool {
        member.should_serialize(value)
    }
}

/// The stock backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectSerializerBackend;

impl ObjectSerializerBackend for DefaultObjectSerializerBackend {}

// -----------------------------------------------------------------------------
// Helpers

fn inaccessible(member: &MemberDescriptor) -> SerialError {
    SerialError::custom(format!("member `{}` is not accessible", member.name()))
}

fn assign(member: &MemberDescriptor, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), SerialError> {
    if !member.has_setter() {
        return Err(SerialError::custom(format!(
            "member `{}` is read-only and cannot be replaced",
            member.name()
        )));
    }
    if member.set(owner, value) {
        Ok(())
    } else {
        Err(SerialError::Mismatch {
            expected: member.type_info().type_path(),
            found: String::from("a value of another type"),
        })
    }
}

/// The collection and item layout of a binary member.
fn binary_layout(
    member: &MemberDescriptor,
) -> Result<(&'static CollectionInfo, &'static BinaryLayout), SerialError> {
    let info = member.type_info();
    info.as_collection()
        .and_then(|collection| {
            let layout = collection.item_info().as_scalar()?.binary()?;
            Some((collection, layout))
        })
        .ok_or_else(|| {
            ConfigurationError::UnsupportedBinary {
                member: String::from(member.name()),
                ty: info.type_path(),
            }
            .into()
        })
}

fn write_binary(
    cx: &mut SerializerContext<'_>,
    member: &MemberDescriptor,
    value: &dyn Any,
) -> Result<(), SerialError> {
    let (collection, layout) = binary_layout(member)?;
    let mut bytes = Vec::with_capacity((collection.ops().len)(value) * layout.width);
    for item in (collection.ops().iter)(value) {
        if !(layout.write)(item, &mut bytes) {
            return Err(SerialError::Mismatch {
                expected: collection.item_info().type_path(),
                found: String::from("an item of another type"),
            });
        }
    }
    let scalar = ScalarEvent::plain(binary::encode(&bytes)).with_tag(CoreSchema::BINARY_TAG);
    cx.emit(Event::Scalar(scalar))
}

fn read_binary(
    cx: &mut SerializerContext<'_>,
    member: &MemberDescriptor,
    owner: &mut dyn Any,
) -> Result<(), SerialError> {
    let (collection, layout) = binary_layout(member)?;
    let parsed = cx.reader()?.take()?;
    let Event::Scalar(scalar) = &parsed.event else {
        return Err(FormatError::new(
            parsed.start,
            parsed.end,
            format!("expected a binary scalar, found {}", parsed.event.name()),
        )
        .into());
    };
    let invalid = |message: &str| -> SerialError {
        FormatError::new(parsed.start, parsed.end, format!("member `{}`: {message}", member.name())).into()
    };

    let bytes = binary::decode(&scalar.value).ok_or_else(|| invalid("invalid base64 data"))?;
    if layout.width == 0 || bytes.len() % layout.width != 0 {
        return Err(invalid("the data length is not a multiple of the item width"));
    }

    let fill = |target: &mut dyn Any| -> Result<(), SerialError> {
        (collection.ops().clear)(target);
        for chunk in bytes.chunks_exact(layout.width) {
            let item = (layout.read)(chunk).ok_or_else(|| invalid("malformed item"))?;
            if !(collection.ops().push)(target, item) {
                return Err(invalid("item rejected by the collection"));
            }
        }
        Ok(())
    };

    match member.get_mut(owner) {
        Some(target) => fill(target),
        None => {
            let info = member.type_info();
            let mut value = cx.settings().object_factory().create(info)?;
            fill(&mut *value)?;
            assign(member, owner, value)
        }
    }
}
