use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome};
use crate::error::{FormatError, SerialError};
use crate::event::{CollectionStart, Event, EventReaderExt};

/// Reads a mapping member by member into `existing`, or into a new
/// instance.
pub(super) fn read(
    cx: &mut ObjectContext<'_, '_>,
    existing: Option<&mut dyn Any>,
) -> Result<ReadOutcome, SerialError> {
    let info = cx.info();
    let start = cx.context().reader()?.take()?;
    if !matches!(start.event, Event::MappingStart(_)) {
        return Err(FormatError::new(
            start.start,
            start.end,
            format!("expected a mapping for `{}`, found {}", info.type_path(), start.event.name()),
        )
        .into());
    }

    let mut created: Option<Box<dyn Any>> = None;
    let target: &mut dyn Any = match existing {
        Some(existing) => existing,
        None => &mut **created.insert(cx.settings().object_factory().create(info)?),
    };

    let descriptor = cx.descriptor().clone();
    let backend = cx.backend();
    let mask = cx.context().member_mask();
    let ignore_unmatched = cx.settings().options().ignore_unmatched_members;

    loop {
        let key = cx.context().reader()?.take()?;
        let raw = match key.event {
            Event::MappingEnd => break,
            Event::Scalar(scalar) => scalar.value,
            other => {
                return Err(FormatError::new(
                    key.start,
                    key.end,
                    format!("expected a member name, found {}", other.name()),
                )
                .into());
            }
        };

        let name = backend.read_member_name(cx, &raw)?;
        if name.skip {
            cx.context().reader()?.skip_node()?;
            continue;
        }
        let Some(member) = descriptor.member(&name.name) else {
            if ignore_unmatched {
                log::trace!("skipping unknown member `{}` of `{}`", name.name, info.type_path());
                cx.context().reader()?.skip_node()?;
                continue;
            }
            return Err(FormatError::new(
                key.start,
                key.end,
                format!("`{}` has no member named `{}`", info.type_path(), name.name),
            )
            .into());
        };
        if !member.is_transferable(mask) {
            cx.context().reader()?.skip_node()?;
            continue;
        }
        backend.read_member_value(cx, member, target)?;
    }

    Ok(match created {
        Some(value) => ReadOutcome::Value(value),
        None => ReadOutcome::Merged,
    })
}

/// Writes the transferable members of `value` as a mapping.
pub(super) fn write(cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
    let descriptor = cx.descriptor().clone();
    let backend = cx.backend();
    let mask = cx.context().member_mask();

    let tag = cx.tag().map(String::from);
    let style = backend.style(cx);
    cx.context()
        .emit(Event::MappingStart(CollectionStart::new(tag, style)))?;

    for member in descriptor.members() {
        if !member.is_transferable(mask) {
            continue;
        }
        let Some(member_value) = member.get(value) else {
            return Err(SerialError::Mismatch {
                expected: descriptor.info().type_path(),
                found: format!("a value without member `{}`", member.original_name()),
            });
        };
        if !backend.should_write_member(cx, member, member_value) {
            continue;
        }
        backend.write_member_name(cx, member)?;
        backend.write_member_value(cx, member, member_value)?;
    }

    cx.context().emit(Event::MappingEnd)
}
