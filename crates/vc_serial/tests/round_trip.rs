//! Values written by one serializer and read back by another.

use std::any::Any;
use std::collections::BTreeMap;

use vc_serial::derive::Typed;
use vc_serial::event::EventBuffer;
use vc_serial::settings::SerializerSettings;
use vc_serial::{ConfigurationError, SerialError, Serializer};

#[derive(Typed, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serial(default)]
enum Shape {
    #[default]
    Circle,
    #[serial(rename = "square", alias = "box")]
    Square,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Vertex {
    x: f32,
    y: f32,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Mesh {
    name: String,
    shape: Shape,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    labels: BTreeMap<String, i64>,
    comment: Option<String>,
}

fn sample_mesh() -> Mesh {
    Mesh {
        name: String::from("quad"),
        shape: Shape::Square,
        vertices: vec![Vertex { x: 0.0, y: 0.0 }, Vertex { x: 1.5, y: -2.0 }],
        indices: vec![0, 1, 2, 2, 3, 0],
        labels: BTreeMap::from([(String::from("lod"), 2), (String::from("pass"), -1)]),
        comment: None,
    }
}

#[test]
fn nested_object_round_trip() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mesh = sample_mesh();

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&mesh, &mut buffer).unwrap();

    let text = buffer.to_test_events();
    assert!(text.contains("=VAL :shape\n=VAL :square\n"));
    assert!(text.contains("=VAL :comment\n=VAL :null\n"));

    let read: Mesh = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, mesh);
}

#[test]
fn tagged_root_round_trip() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mesh = sample_mesh();

    let mut buffer = EventBuffer::new();
    serializer.serialize(&mesh, &mut buffer).unwrap();
    assert!(buffer.to_test_events().contains("+MAP <!round_trip::Mesh>"));

    let read = serializer.deserialize(&mut buffer, None).unwrap();
    assert_eq!(read.value.downcast_ref::<Mesh>(), Some(&mesh));
}

#[test]
fn enum_alias_is_read() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events("=VAL :box\n").unwrap();

    let shape: Shape = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(shape, Shape::Square);
}

#[test]
fn quoted_strings_stay_strings() {
    let serializer = Serializer::new(SerializerSettings::new());
    let value = vec![String::from("42"), String::from(" padded "), String::from("plain")];

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&value, &mut buffer).unwrap();
    let text = buffer.to_test_events();
    assert!(text.contains("=VAL \"42\n"));
    assert!(text.contains("=VAL \" padded \n"));
    assert!(text.contains("=VAL :plain\n"));

    let read: Vec<String> = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, value);
}

#[derive(Typed)]
#[serial(default)]
struct Holder {
    payload: Box<dyn Any>,
}

impl Holder {
    fn new(payload: Box<dyn Any>) -> Self {
        Self { payload }
    }
}

impl Default for Holder {
    fn default() -> Self {
        Self::new(Box::new(()))
    }
}

#[test]
fn polymorphic_member_keeps_its_type() {
    let settings = SerializerSettings::new();
    settings.register_type::<Vertex>();
    let serializer = Serializer::new(settings);

    let holder = Holder::new(Box::new(Vertex { x: 1.0, y: 2.0 }));
    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&holder, &mut buffer).unwrap();
    assert!(buffer.to_test_events().contains("+MAP <!round_trip::Vertex>"));

    let read: Holder = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(
        read.payload.downcast_ref::<Vertex>(),
        Some(&Vertex { x: 1.0, y: 2.0 })
    );
}

#[test]
fn polymorphic_integers_read_as_i64() {
    let serializer = Serializer::new(SerializerSettings::new());

    let holder = Holder::new(Box::new(7_u8));
    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&holder, &mut buffer).unwrap();

    let read: Holder = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read.payload.downcast_ref::<i64>(), Some(&7));
}

#[test]
fn unregistered_runtime_types_are_named_by_their_slot() {
    let serializer = Serializer::new(SerializerSettings::new());

    let holder = Holder::new(Box::new(Vertex { x: 1.0, y: 2.0 }));
    let mut buffer = EventBuffer::new();
    let err = serializer.serialize_as(&holder, &mut buffer).unwrap_err();
    assert!(matches!(
        err,
        SerialError::Configuration(ConfigurationError::UnregisteredType { .. })
    ));
    let message = err.to_string();
    assert!(message.contains("`Any`"));
    assert!(message.contains("SerializerSettings::register_type"));
    assert!(!message.contains("TypeId"));
}
