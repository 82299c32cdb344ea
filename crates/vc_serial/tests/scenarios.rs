//! The three reference scenarios: a tagged object, member masks and an
//! unknown tag.

use std::any::Any;

use vc_serial::derive::Typed;
use vc_serial::event::{EventBuffer, EventReader};
use vc_serial::info::Typed;
use vc_serial::settings::{SerializerOptions, SerializerSettings};
use vc_serial::{SerialError, Serializer};

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Probe {
    #[serial(rename = "Value", mask = 1)]
    value: i32,
    #[serial(rename = "Debug", mask = 2)]
    debug: String,
}

#[test]
fn scenario_a_tagged_point() {
    let settings = SerializerSettings::new();
    settings.register_tag::<Point>("!!Point", false).unwrap();
    let serializer = Serializer::new(settings);

    let mut buffer = EventBuffer::new();
    serializer.serialize(&Point { x: 1, y: 2 }, &mut buffer).unwrap();
    assert_eq!(
        buffer.to_test_events(),
        "\
+STR
+DOC
+MAP <!!Point>
=VAL :x
=VAL :1
=VAL :y
=VAL :2
-MAP
-DOC
-STR
"
    );

    let read = serializer.deserialize(&mut buffer, None).unwrap();
    assert!(!read.remap_occurred);
    assert_eq!(read.value.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
}

fn write_probe(member_mask: u32) -> String {
    let options = SerializerOptions {
        member_mask,
        ..SerializerOptions::default()
    };
    let serializer = Serializer::new(SerializerSettings::from_options(options));
    let probe = Probe {
        value: 7,
        debug: String::from("trace"),
    };

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&probe, &mut buffer).unwrap();
    buffer.to_test_events()
}

#[test]
fn scenario_b_member_mask() {
    let only_value = write_probe(1);
    assert!(only_value.contains("=VAL :Value\n=VAL :7\n"));
    assert!(!only_value.contains("Debug"));

    let both = write_probe(3);
    assert!(both.contains("=VAL :Value\n=VAL :7\n"));
    assert!(both.contains("=VAL :Debug\n=VAL :trace\n"));
}

#[test]
fn scenario_b_masked_members_are_skipped_on_read() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+MAP
=VAL :Value
=VAL :3
=VAL :Debug
=VAL :ignored
-MAP
",
    )
    .unwrap();

    let probe: Probe = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(probe.value, 3);
    assert!(probe.debug.is_empty());
}

const UNKNOWN_WIDGET: &str = "\
+STR
+DOC
+MAP <!UnknownWidget>
=VAL :size
=VAL :3
-MAP
-DOC
-STR
";

#[test]
fn scenario_c_unknown_tag_fails() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(UNKNOWN_WIDGET).unwrap();

    let err = serializer.deserialize(&mut buffer, None).unwrap_err();
    let SerialError::Format(err) = err else {
        panic!("expected a format error, got {err:?}");
    };
    assert!(err.message().contains("!UnknownWidget"));
    assert_eq!(err.start().line, 3);
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn scenario_c_unknown_tag_tolerated() {
    let options = SerializerOptions {
        error_tolerant: true,
        ..SerializerOptions::default()
    };
    let serializer = Serializer::new(SerializerSettings::from_options(options));
    let mut buffer = EventBuffer::from_test_events(UNKNOWN_WIDGET).unwrap();

    let read = serializer.deserialize(&mut buffer, None).unwrap();
    assert!(read.remap_occurred);
    assert!(buffer.current().is_none());

    let node = read
        .value
        .downcast_ref::<vc_serial::dynamic::DynamicNode>()
        .unwrap();
    assert_eq!(node.tag(), Some("!UnknownWidget"));
    assert_eq!(node.get("size").and_then(|size| size.as_str()), Some("3"));

    // A polymorphic slot reads the same node.
    buffer.rewind();
    let read = serializer
        .deserialize(&mut buffer, Some(<Box<dyn Any>>::type_info()))
        .unwrap();
    assert!(read.remap_occurred);
}
