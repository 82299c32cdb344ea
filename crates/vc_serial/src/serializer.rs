//! Document-level entry points.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;

use crate::context::{ReadOutcome, SerializerContext};
use crate::error::SerialError;
use crate::event::{DataStyle, Event, EventReader, EventReaderExt, EventWriter};
use crate::info::{TypeInfo, Typed};
use crate::settings::SerializerSettings;

// -----------------------------------------------------------------------------
// Results

/// A value read by [`Serializer::deserialize`].
#[derive(Debug)]
pub struct Deserialized {
    pub value: Box<dyn Any>,
    /// A tag was read through an alias or, under error tolerance, could not
    /// be resolved.
    pub remap_occurred: bool,
}

/// Summary of [`Serializer::deserialize_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializeReport {
    pub remap_occurred: bool,
}

// -----------------------------------------------------------------------------
// Serializer

/// Reads and writes single-document streams.
///
/// Writing emits the stream and document framing around the value. Reading
/// accepts the framing but does not require it.
///
/// ```
/// use vc_serial::derive::Typed;
/// use vc_serial::event::EventBuffer;
/// use vc_serial::serializer::Serializer;
/// use vc_serial::settings::SerializerSettings;
///
/// #[derive(Typed, Default, Debug, PartialEq)]
/// #[serial(default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let settings = SerializerSettings::new();
/// settings.register_tag::<Point>("!!Point", false).unwrap();
/// let serializer = Serializer::new(settings);
///
/// let mut buffer = EventBuffer::new();
/// serializer.serialize(&Point { x: 1, y: 2 }, &mut buffer).unwrap();
/// assert_eq!(
///     buffer.to_test_events(),
///     "+STR\n+DOC\n+MAP <!!Point>\n=VAL :x\n=VAL :1\n=VAL :y\n=VAL :2\n-MAP\n-DOC\n-STR\n"
/// );
///
/// let point: Point = serializer.deserialize_as(&mut buffer).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
    settings: Arc<SerializerSettings>,
}

impl Serializer {
    pub fn new(settings: SerializerSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// A serializer sharing existing settings.
    pub fn with_settings(settings: Arc<SerializerSettings>) -> Self {
        Self { settings }
    }

    #[inline]
    pub fn settings(&self) -> &Arc<SerializerSettings> {
        &self.settings
    }

    /// Writes `value` with its tag.
    pub fn serialize<T: Typed>(&self, value: &T, writer: &mut dyn EventWriter) -> Result<(), SerialError> {
        self.settings.tag_registry().register_type(T::type_info());
        self.write_document(value, T::type_info(), None, writer)
    }

    /// Writes `value` without a tag, the reader is expected to know `T`.
    pub fn serialize_as<T: Typed>(&self, value: &T, writer: &mut dyn EventWriter) -> Result<(), SerialError> {
        self.write_document(value, T::type_info(), Some(T::type_info()), writer)
    }

    fn write_document(
        &self,
        value: &dyn Any,
        info: &'static TypeInfo,
        expected: Option<&'static TypeInfo>,
        writer: &mut dyn EventWriter,
    ) -> Result<(), SerialError> {
        let implicit = !self.settings.options().emit_document_markers;
        writer.emit(Event::StreamStart)?;
        writer.emit(Event::DocumentStart { implicit })?;
        {
            let mut cx = SerializerContext::for_writing(&self.settings, writer);
            cx.write_typed(value, info, expected, DataStyle::Any)?;
        }
        writer.emit(Event::DocumentEnd { implicit })?;
        writer.emit(Event::StreamEnd)
    }

    /// Reads one value, of type `expected` or of the type named by the tag
    /// of the root node.
    pub fn deserialize(
        &self,
        reader: &mut dyn EventReader,
        expected: Option<&'static TypeInfo>,
    ) -> Result<Deserialized, SerialError> {
        self.read_document(reader, |cx| {
            let value = cx.read_yaml(None, expected)?.into_value()?;
            Ok(Deserialized {
                value,
                remap_occurred: cx.remap_occurred(),
            })
        })
    }

    pub fn deserialize_as<T: Typed>(&self, reader: &mut dyn EventReader) -> Result<T, SerialError> {
        let read = self.deserialize(reader, Some(T::type_info()))?;
        match read.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(SerialError::Mismatch {
                expected: T::type_info().type_path(),
                found: String::from("a value of another type"),
            }),
        }
    }

    /// Reads the root node into `existing`.
    pub fn deserialize_into<T: Typed>(
        &self,
        reader: &mut dyn EventReader,
        existing: &mut T,
    ) -> Result<DeserializeReport, SerialError> {
        self.read_document(reader, |cx| {
            if let ReadOutcome::Value(value) = cx.read_yaml(Some(&mut *existing as &mut dyn Any), Some(T::type_info()))? {
                match value.downcast::<T>() {
                    Ok(value) => *existing = *value,
                    Err(_) => {
                        return Err(SerialError::Mismatch {
                            expected: T::type_info().type_path(),
                            found: String::from("a value of another type"),
                        });
                    }
                }
            }
            Ok(DeserializeReport {
                remap_occurred: cx.remap_occurred(),
            })
        })
    }

    fn read_document<R>(
        &self,
        reader: &mut dyn EventReader,
        read: impl FnOnce(&mut SerializerContext<'_>) -> Result<R, SerialError>,
    ) -> Result<R, SerialError> {
        reader.take_if(|event| matches!(event, Event::StreamStart))?;
        reader.take_if(|event| matches!(event, Event::DocumentStart { .. }))?;
        let result = {
            let mut cx = SerializerContext::for_reading(&self.settings, &mut *reader)?;
            read(&mut cx)?
        };
        reader.take_if(|event| matches!(event, Event::DocumentEnd { .. }))?;
        reader.take_if(|event| matches!(event, Event::StreamEnd))?;
        Ok(result)
    }
}
