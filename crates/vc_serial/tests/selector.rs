//! Serializer binding and extension points.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vc_serial::context::{ObjectContext, ReadOutcome, SerializerContext};
use vc_serial::derive::Typed;
use vc_serial::descriptor::TypeDescriptor;
use vc_serial::error::{ConfigurationError, FormatError, SerialError};
use vc_serial::event::{DataStyle, Event, EventBuffer, EventReaderExt, ScalarEvent};
use vc_serial::info::Typed;
use vc_serial::serializers::{BuiltinSerializer, SerializerFactory, YamlSerializable};
use vc_serial::settings::SerializerSettings;
use vc_serial::Serializer;

#[derive(Typed, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serial(default)]
struct Color {
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Theme {
    background: Color,
    accents: Vec<Color>,
}

/// Writes colors as `#rrggbb`.
struct HexColor;

impl YamlSerializable for HexColor {
    fn read_yaml(
        &self,
        cx: &mut ObjectContext<'_, '_>,
        _existing: Option<&mut dyn Any>,
    ) -> Result<ReadOutcome, SerialError> {
        let parsed = cx.context().reader()?.take()?;
        let invalid = || -> SerialError { FormatError::new(parsed.start, parsed.end, "invalid color").into() };
        let Event::Scalar(scalar) = &parsed.event else {
            return Err(invalid());
        };
        let hex = scalar.value.strip_prefix('#').ok_or_else(invalid)?;
        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        let [_, r, g, b] = value.to_be_bytes();
        Ok(ReadOutcome::Value(Box::new(Color { r, g, b })))
    }

    fn write_yaml(&self, cx: &mut ObjectContext<'_, '_>, value: &dyn Any) -> Result<(), SerialError> {
        let color = value
            .downcast_ref::<Color>()
            .ok_or(SerialError::custom("not a color"))?;
        let text = format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
        cx.context().emit(Event::Scalar(ScalarEvent::plain(text)))
    }
}

/// Hands out [`HexColor`] and counts how often it is asked.
#[derive(Default)]
struct ColorFactory {
    calls: AtomicUsize,
}

impl SerializerFactory for ColorFactory {
    fn try_create(
        &self,
        _cx: &SerializerContext<'_>,
        descriptor: &TypeDescriptor,
    ) -> Option<Arc<dyn YamlSerializable>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        (descriptor.info().id() == Color::type_info().id()).then(|| Arc::new(HexColor) as Arc<dyn YamlSerializable>)
    }
}

/// Resolves the serializer of `Color` while deciding on `Theme`, then
/// leaves `Theme` to the builtin serializer.
#[derive(Default)]
struct NestedFactory {
    color: Mutex<Option<Arc<dyn YamlSerializable>>>,
}

impl SerializerFactory for NestedFactory {
    fn try_create(
        &self,
        cx: &SerializerContext<'_>,
        descriptor: &TypeDescriptor,
    ) -> Option<Arc<dyn YamlSerializable>> {
        if descriptor.info().id() != Theme::type_info().id() {
            return None;
        }
        let nested = cx.find_type_descriptor(Color::type_info());
        let color = cx.settings().selector().get_serializer(cx, &nested).ok()?;
        *self.color.lock().unwrap() = Some(color);
        None
    }
}

fn theme() -> Theme {
    Theme {
        background: Color { r: 0x10, g: 0x20, b: 0x30 },
        accents: vec![Color { r: 0xff, g: 0, b: 0 }],
    }
}

#[test]
fn registered_serializer_is_used() {
    let settings = SerializerSettings::new();
    settings.add_serializer::<Color>(Arc::new(HexColor)).unwrap();
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&theme(), &mut buffer).unwrap();
    let text = buffer.to_test_events();
    assert!(text.contains("=VAL :background\n=VAL :#102030\n"));
    assert!(text.contains("=VAL :#ff0000\n"));

    let read: Theme = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, theme());
}

#[test]
fn a_type_is_bound_once() {
    let settings = SerializerSettings::new();
    settings.add_serializer::<Color>(Arc::new(HexColor)).unwrap();

    let err = settings.add_serializer::<Color>(Arc::new(HexColor)).unwrap_err();
    assert!(matches!(err, ConfigurationError::SerializerAlreadyBound(_)));
}

#[test]
fn lookups_bind_the_builtin_serializer() {
    let settings = SerializerSettings::new();
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&theme(), &mut buffer).unwrap();

    let selector = serializer.settings().selector();
    assert!(selector.is_bound(Color::type_info()));
    assert!(
        serializer
            .settings()
            .add_serializer::<Color>(Arc::new(HexColor))
            .is_err()
    );
}

#[test]
fn factory_is_consulted_once_per_type() {
    let factory = Arc::new(ColorFactory::default());
    let settings = SerializerSettings::new();
    settings.add_serializer_factory(factory.clone());

    let descriptor = settings.descriptor_factory().find(Color::type_info());
    let mut sink = EventBuffer::new();
    let cx = SerializerContext::for_writing(&settings, &mut sink);

    let first = settings.selector().get_serializer(&cx, &descriptor).unwrap();
    let second = settings.selector().get_serializer(&cx, &descriptor).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.calls.load(Ordering::Relaxed), 1);
}

#[test]
fn factory_serializer_round_trips() {
    let settings = SerializerSettings::new();
    settings.add_serializer_factory(Arc::new(ColorFactory::default()));
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&theme(), &mut buffer).unwrap();
    assert!(buffer.to_test_events().contains("=VAL :#102030\n"));

    let read: Theme = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, theme());
}

#[test]
fn serializer_errors_carry_the_node_position() {
    let settings = SerializerSettings::new();
    settings.add_serializer::<Color>(Arc::new(HexColor)).unwrap();
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::from_test_events(
        "\
+MAP
=VAL :background
=VAL :red
-MAP
",
    )
    .unwrap();
    let err = serializer.deserialize_as::<Theme>(&mut buffer).unwrap_err();
    let err = err.as_format().unwrap();
    assert_eq!(err.message(), "invalid color");
    assert_eq!(err.start().line, 3);
}

#[test]
fn factories_may_resolve_nested_types() {
    let factory = Arc::new(NestedFactory::default());
    let settings = SerializerSettings::new();
    settings.add_serializer::<Color>(Arc::new(HexColor)).unwrap();
    settings.add_serializer_factory(factory.clone());

    let descriptor = settings.descriptor_factory().find(Theme::type_info());
    let mut sink = EventBuffer::new();
    let cx = SerializerContext::for_writing(&settings, &mut sink);
    settings.selector().get_serializer(&cx, &descriptor).unwrap();

    assert!(settings.selector().is_bound(Theme::type_info()));
    let color = factory.color.lock().unwrap().clone().unwrap();
    let bound = settings
        .selector()
        .get_serializer(&cx, &cx.find_type_descriptor(Color::type_info()))
        .unwrap();
    assert!(Arc::ptr_eq(&color, &bound));
}

#[test]
fn nested_resolution_during_serialization_completes() {
    let settings = SerializerSettings::new();
    settings.add_serializer_factory(Arc::new(NestedFactory::default()));
    settings.add_serializer_factory(Arc::new(ColorFactory::default()));
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&theme(), &mut buffer).unwrap();
    assert!(buffer.to_test_events().contains("=VAL :#102030\n"));

    let read: Theme = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, theme());
}

#[test]
fn object_writes_reject_values_of_another_type() {
    let settings = SerializerSettings::new();
    let descriptor = settings.descriptor_factory().find(Color::type_info());
    let mut sink = EventBuffer::new();
    let mut cx = SerializerContext::for_writing(&settings, &mut sink);
    let mut object = ObjectContext::new(&mut cx, descriptor, None, DataStyle::Any);

    let err = BuiltinSerializer::Object.write_yaml(&mut object, &theme()).unwrap_err();
    match err {
        SerialError::Mismatch { expected, found } => {
            assert_eq!(expected, Color::type_info().type_path());
            assert!(found.starts_with("a value without member"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
