use alloc::format;
use alloc::string::String;
use core::any::{Any, TypeId};

use crate::context::{ObjectContext, ReadOutcome};
use crate::error::{FormatError, SerialError};
use crate::event::{Event, EventReaderExt, ScalarEvent, ScalarStyle};
use crate::info::ScalarInfo;

fn scalar_info(cx: &ObjectContext<'_, '_>) -> Result<&'static ScalarInfo, SerialError> {
    cx.info()
        .as_scalar()
        .ok_or(SerialError::NoSerializer(cx.info().type_path()))
}

/// Parses the scalar under the cursor. Always yields a new value.
pub(super) fn read(cx: &mut ObjectContext<'_, '_>) -> Result<ReadOutcome, SerialError> {
    let info = cx.info();
    let scalar_info = scalar_info(cx)?;
    let parsed = cx.context().reader()?.take()?;
    let Event::Scalar(scalar) = &parsed.event else {
        return Err(FormatError::new(
            parsed.start,
            parsed.end,
            format!("expected a scalar for `{}`, found {}", info.type_path(), parsed.event.name()),
        )
        .into());
    };

    match scalar_info.parse(&scalar.value) {
        Ok(value) => Ok(ReadOutcome::Value(value)),
        Err(err) => Err(FormatError::new(parsed.start, parsed.end, format!("{err}"))
            .with_source(err)
            .into()),
    }
}

/// Formats `value` as a scalar.
///
/// The schema tag of the type is dropped when implicit resolution of the
/// text already yields it. Strings that would not resolve back to a string
/// are double quoted.
pub(super) fn write(cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
    let info = cx.info();
    let Some(text) = scalar_info(cx)?.format(value) else {
        return Err(SerialError::Mismatch {
            expected: info.type_path(),
            found: String::from("a value of another type"),
        });
    };

    let schema = cx.settings().schema();
    let implicit = schema
        .try_parse(&ScalarEvent::plain(text.as_str()), false)
        .map(|parsed| parsed.tag);
    let default_tag = schema.default_tag(info.id());

    let mut tag = cx.tag().map(String::from);
    if default_tag.is_some()
        && implicit == default_tag
        && tag.as_deref().is_none_or(|tag| Some(tag) == default_tag)
    {
        tag = None;
    }

    let str_tag = schema.default_tag(TypeId::of::<String>());
    let is_text = default_tag.is_some() && default_tag == str_tag;
    let quoted = (is_text && implicit != str_tag)
        || text.contains('\n')
        || text.starts_with(' ')
        || text.ends_with(' ');
    let style = if quoted {
        ScalarStyle::DoubleQuoted
    } else {
        ScalarStyle::Plain
    };

    let mut scalar = ScalarEvent::new(text, style);
    scalar.tag = tag;
    cx.context().emit(Event::Scalar(scalar))
}
