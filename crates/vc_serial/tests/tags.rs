//! Tag assignment, aliases and assemblies.

use vc_serial::derive::Typed;
use vc_serial::error::ConfigurationError;
use vc_serial::event::EventBuffer;
use vc_serial::info::Typed;
use vc_serial::registry::{Assembly, TagTableEntry};
use vc_serial::settings::{SerializerOptions, SerializerSettings};
use vc_serial::Serializer;

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default, tag = "!Sprite", tag_alias = "!LegacySprite")]
struct Sprite {
    frame: u32,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Sound {
    volume: f64,
}

fn sprite_events(tag: &str) -> EventBuffer {
    EventBuffer::from_test_events(&format!("+MAP <{tag}>\n=VAL :frame\n=VAL :4\n-MAP\n")).unwrap()
}

#[test]
fn tag_is_stable_across_writes() {
    let settings = SerializerSettings::new();
    settings.register_type::<Sprite>();
    let serializer = Serializer::new(settings);

    let mut first = EventBuffer::new();
    let mut second = EventBuffer::new();
    serializer.serialize(&Sprite { frame: 1 }, &mut first).unwrap();
    serializer.serialize(&Sprite { frame: 2 }, &mut second).unwrap();

    assert!(first.to_test_events().contains("+MAP <!Sprite>"));
    assert!(second.to_test_events().contains("+MAP <!Sprite>"));
    assert_eq!(
        serializer.settings().tag_registry().tag_from_type(Sprite::type_info()),
        "!Sprite"
    );
}

#[test]
fn canonical_tag_does_not_remap() {
    let settings = SerializerSettings::new();
    settings.register_type::<Sprite>();
    let serializer = Serializer::new(settings);

    let read = serializer.deserialize(&mut sprite_events("!Sprite"), None).unwrap();
    assert!(!read.remap_occurred);
    assert_eq!(read.value.downcast_ref::<Sprite>(), Some(&Sprite { frame: 4 }));
}

#[test]
fn alias_tag_remaps() {
    let settings = SerializerSettings::new();
    settings.register_type::<Sprite>();
    let serializer = Serializer::new(settings);

    let read = serializer.deserialize(&mut sprite_events("!LegacySprite"), None).unwrap();
    assert!(read.remap_occurred);
    assert_eq!(read.value.downcast_ref::<Sprite>(), Some(&Sprite { frame: 4 }));

    // The alias is never written.
    assert_eq!(
        serializer.settings().tag_registry().tag_from_type(Sprite::type_info()),
        "!Sprite"
    );
}

#[test]
fn tag_falls_back_to_the_type_path() {
    let serializer = Serializer::new(SerializerSettings::new());

    let mut buffer = EventBuffer::new();
    serializer.serialize(&Sound { volume: 0.5 }, &mut buffer).unwrap();
    assert!(buffer.to_test_events().contains("+MAP <!tags::Sound>"));

    let read = serializer.deserialize(&mut buffer, None).unwrap();
    assert_eq!(read.value.downcast_ref::<Sound>(), Some(&Sound { volume: 0.5 }));
}

#[test]
fn replacing_the_canonical_tag_keeps_the_old_one_readable() {
    let settings = SerializerSettings::new();
    settings.register_tag::<Sound>("!Audio", false).unwrap();
    settings.register_tag::<Sound>("!Sound", false).unwrap();

    let tags = settings.tag_registry();
    assert_eq!(tags.tag_from_type(Sound::type_info()), "!Sound");

    let old = tags.type_from_tag("!Audio").unwrap();
    assert!(old.is_alias);
    assert_eq!(old.info.id(), Sound::type_info().id());
}

#[test]
fn alias_cannot_shadow_a_canonical_tag() {
    let settings = SerializerSettings::new();
    settings.register_tag::<Sound>("!Sound", false).unwrap();

    let err = settings.register_tag::<Sprite>("!Sound", true).unwrap_err();
    assert!(matches!(err, ConfigurationError::AliasOverCanonical { .. }));
    assert!(matches!(
        settings.register_tag::<Sprite>("", false),
        Err(ConfigurationError::EmptyTag)
    ));
}

#[test]
fn assembly_tag_table_is_used() {
    let settings = SerializerSettings::new();
    let assembly = Assembly::new("audio")
        .with_type::<Sound>()
        .with_tag_table(vec![TagTableEntry {
            tag: "!Snd".into(),
            info: Sound::type_info(),
            is_alias: false,
        }]);

    let registration = settings.register_assembly(assembly);
    assert!(registration.newly_registered);
    assert!(settings.tag_registry().assembly_names().contains(&String::from("audio")));

    let mapped = settings.tag_registry().type_from_tag("!Snd").unwrap();
    assert_eq!(mapped.info.id(), Sound::type_info().id());

    let again = settings.register_assembly(Assembly::new("audio"));
    assert!(!again.newly_registered);
}

#[test]
fn later_registration_resolves_a_failed_tag() {
    let settings = SerializerSettings::new();
    let tags = settings.tag_registry();
    assert!(tags.type_from_tag("!tags::Late").is_none());

    #[derive(Typed, Default)]
    #[serial(default)]
    struct Late;

    settings.register_type::<Late>();
    let path = Late::type_info().type_path();
    let mapped = tags.type_from_tag(&format!("!{path}")).unwrap();
    assert_eq!(mapped.info.id(), Late::type_info().id());
}

#[test]
fn escaped_tags_resolve() {
    let settings = SerializerSettings::new();
    settings.register_tag::<Sound>("!Sound Effect", false).unwrap();

    let tags = settings.tag_registry();
    assert_eq!(tags.tag_from_type(Sound::type_info()), "!Sound%20Effect");
    let mapped = tags.type_from_tag("!Sound%20Effect").unwrap();
    assert_eq!(mapped.info.id(), Sound::type_info().id());
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Spot {
    x: i32,
}

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Marker {
    #[serial(tag = "!Where")]
    at: Spot,
    #[serial(tag = "!custom")]
    value: i32,
}

fn marker() -> Marker {
    Marker {
        at: Spot { x: 5 },
        value: 3,
    }
}

#[test]
fn member_tags_are_written_and_read_back() {
    let serializer = Serializer::new(SerializerSettings::new());

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&marker(), &mut buffer).unwrap();
    let text = buffer.to_test_events();
    assert!(text.contains("=VAL :at\n+MAP <!Where>\n=VAL :x\n=VAL :5\n-MAP\n"));
    assert!(text.contains("=VAL :value\n=VAL <!custom> :3\n"));

    let read = serializer.deserialize(&mut buffer, Some(Marker::type_info())).unwrap();
    assert!(!read.remap_occurred);
    assert_eq!(read.value.downcast_ref::<Marker>(), Some(&marker()));
}

#[test]
fn member_tags_are_optional_on_read() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+MAP
=VAL :at
+MAP
=VAL :x
=VAL :5
-MAP
=VAL :value
=VAL :3
-MAP
",
    )
    .unwrap();

    let read: Marker = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read, marker());
}

#[test]
fn other_tags_on_a_tagged_member_still_resolve() {
    let serializer = Serializer::new(SerializerSettings::new());
    let mut buffer = EventBuffer::from_test_events(
        "\
+MAP
=VAL :value
=VAL <!other> :3
-MAP
",
    )
    .unwrap();

    let err = serializer.deserialize_as::<Marker>(&mut buffer).unwrap_err();
    let err = err.as_format().unwrap();
    assert!(err.message().contains("!other"));
    assert_eq!(err.start().line, 3);
}

#[test]
fn member_tags_follow_emit_tags() {
    let options = SerializerOptions {
        emit_tags: false,
        ..SerializerOptions::default()
    };
    let serializer = Serializer::new(SerializerSettings::from_options(options));

    let mut buffer = EventBuffer::new();
    serializer.serialize_as(&marker(), &mut buffer).unwrap();
    assert!(!buffer.to_test_events().contains('<'));
}
