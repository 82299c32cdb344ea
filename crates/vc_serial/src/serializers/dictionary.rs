use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use core::any::Any;

use crate::context::{ObjectContext, ReadOutcome};
use crate::error::{FormatError, SerialError};
use crate::event::{CollectionStart, Event, EventReaderExt};
use crate::info::DictionaryInfo;

fn dictionary_info(cx: &ObjectContext<'_, '_>) -> Result<&'static DictionaryInfo, SerialError> {
    cx.info()
        .as_dictionary()
        .ok_or(SerialError::NoSerializer(cx.info().type_path()))
}

/// Reads a mapping of keys to values. An existing map is cleared first.
pub(super) fn read(
    cx: &mut ObjectContext<'_, '_>,
    existing: Option<&mut dyn Any>,
) -> Result<ReadOutcome, SerialError> {
    let info = cx.info();
    let dictionary = dictionary_info(cx)?;
    let start = cx.context().reader()?.take()?;
    if !matches!(start.event, Event::MappingStart(_)) {
        return Err(FormatError::new(
            start.start,
            start.end,
            format!("expected a mapping for `{}`, found {}", info.type_path(), start.event.name()),
        )
        .into());
    }

    let ops = dictionary.ops();
    let mut created: Option<Box<dyn Any>> = None;
    let target: &mut dyn Any = match existing {
        Some(existing) => {
            (ops.clear)(existing);
            existing
        }
        None => &mut **created.insert(cx.settings().object_factory().create(info)?),
    };

    let backend = cx.backend();
    let (key_info, value_info) = (dictionary.key_info(), dictionary.value_info());
    while !cx.context().reader()?.take_if(|event| matches!(event, Event::MappingEnd))? {
        let (key, value) = backend.read_dictionary_item(cx, key_info, value_info)?;
        if !(ops.insert)(target, key, value) {
            return Err(SerialError::Mismatch {
                expected: info.type_path(),
                found: String::from("a pair of other types"),
            });
        }
    }

    Ok(match created {
        Some(value) => ReadOutcome::Value(value),
        None => ReadOutcome::Merged,
    })
}

/// Writes the pairs as a mapping, in the iteration order of the map.
pub(super) fn write(cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
    let dictionary = dictionary_info(cx)?;
    let backend = cx.backend();
    let (key_info, value_info) = (dictionary.key_info(), dictionary.value_info());

    let tag = cx.tag().map(String::from);
    let style = backend.style(cx);
    cx.context()
        .emit(Event::MappingStart(CollectionStart::new(tag, style)))?;
    for pair in (dictionary.ops().iter)(value) {
        backend.write_dictionary_item(cx, pair, key_info, value_info)?;
    }
    cx.context().emit(Event::MappingEnd)
}
