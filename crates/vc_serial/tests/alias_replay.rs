//! Anchors and aliases in the input.

use vc_serial::derive::Typed;
use vc_serial::event::EventBuffer;
use vc_serial::settings::SerializerSettings;
use vc_serial::Serializer;

#[derive(Typed, Default, Debug, Clone, PartialEq)]
#[serial(default)]
struct Material {
    name: String,
    roughness: f64,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Scene {
    primary: Material,
    secondary: Material,
    palette: Vec<Material>,
}

#[test]
fn aliases_read_as_independent_copies() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+MAP
=VAL :primary
+MAP &stone
=VAL :name
=VAL :stone
=VAL :roughness
=VAL :0.75
-MAP
=VAL :secondary
=ALI *stone
=VAL :palette
+SEQ
=ALI *stone
+MAP
=VAL :name
=VAL &label :metal
=VAL :roughness
=VAL :0.25
-MAP
-SEQ
-MAP
",
    )
    .unwrap();

    let mut scene: Scene = serializer.deserialize_as(&mut buffer).unwrap();
    let stone = Material {
        name: String::from("stone"),
        roughness: 0.75,
    };
    assert_eq!(scene.primary, stone);
    assert_eq!(scene.secondary, stone);
    assert_eq!(scene.palette[0], stone);
    assert_eq!(scene.palette[1].name, "metal");

    scene.secondary.name.push_str("-copy");
    assert_eq!(scene.primary.name, "stone");
}

#[test]
fn scalar_aliases_expand() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+SEQ
=VAL &n :42
=ALI *n
=ALI *n
-SEQ
",
    )
    .unwrap();

    let values: Vec<u32> = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(values, [42, 42, 42]);
}

#[test]
fn unknown_anchor_is_a_format_error() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+SEQ
=VAL :1
=ALI *missing
-SEQ
",
    )
    .unwrap();

    let err = serializer.deserialize_as::<Vec<u32>>(&mut buffer).unwrap_err();
    let err = err.as_format().unwrap();
    assert!(err.message().contains("*missing"));
    assert_eq!(err.start().line, 3);
}
