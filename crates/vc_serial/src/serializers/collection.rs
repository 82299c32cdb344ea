use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome};
use crate::error::{FormatError, SerialError};
use crate::event::{CollectionStart, DataStyle, Event, EventReaderExt};
use crate::info::CollectionInfo;

fn collection_info(cx: &ObjectContext<'_, '_>) -> Result<&'static CollectionInfo, SerialError> {
    cx.info()
        .as_collection()
        .ok_or(SerialError::NoSerializer(cx.info().type_path()))
}

/// Reads a sequence. An existing collection is cleared first.
pub(super) fn read(
    cx: &mut ObjectContext<'_, '_>,
    existing: Option<&mut dyn Any>,
) -> Result<ReadOutcome, SerialError> {
    let info = cx.info();
    let collection = collection_info(cx)?;
    let start = cx.context().reader()?.take()?;
    if !matches!(start.event, Event::SequenceStart(_)) {
        return Err(FormatError::new(
            start.start,
            start.end,
            format!("expected a sequence for `{}`, found {}", info.type_path(), start.event.name()),
        )
        .into());
    }

    let ops = collection.ops();
    let mut created: Option<Box<dyn Any>> = None;
    let target: &mut dyn Any = match existing {
        Some(existing) => {
            (ops.clear)(existing);
            existing
        }
        None => &mut **created.insert(cx.settings().object_factory().create(info)?),
    };

    let backend = cx.backend();
    let item_info = collection.item_info();
    while !cx.context().reader()?.take_if(|event| matches!(event, Event::SequenceEnd))? {
        let item = backend.read_collection_item(cx, item_info)?;
        if !(ops.push)(target, item) {
            return Err(SerialError::Mismatch {
                expected: item_info.type_path(),
                found: String::from("an item of another type"),
            });
        }
    }

    Ok(match created {
        Some(value) => ReadOutcome::Value(value),
        None => ReadOutcome::Merged,
    })
}

/// Writes the items as a sequence.
///
/// Short sequences of scalars use the flow style when
/// `flow_primitive_sequence_limit` allows it and no style is requested.
pub(super) fn write(cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
    let collection = collection_info(cx)?;
    let ops = collection.ops();
    let item_info = collection.item_info();
    let backend = cx.backend();

    let mut style = backend.style(cx);
    let limit = cx.settings().options().flow_primitive_sequence_limit;
    if style == DataStyle::Any
        && item_info.as_scalar().is_some()
        && (ops.len)(value) <= limit
    {
        style = DataStyle::Flow;
    }

    let tag = cx.tag().map(String::from);
    cx.context()
        .emit(Event::SequenceStart(CollectionStart::new(tag, style)))?;
    for item in (ops.iter)(value) {
        backend.write_collection_item(cx, item, item_info)?;
    }
    cx.context().emit(Event::SequenceEnd)
}
