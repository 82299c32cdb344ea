//! Serializer options, loaded from RON the way a host would.

use vc_serial::derive::Typed;
use vc_serial::event::{DataStyle, EventBuffer};
use vc_serial::settings::{SerializerOptions, SerializerSettings};
use vc_serial::Serializer;

#[derive(Typed, Default, Debug, PartialEq)]
#[serial(default)]
struct Track {
    title: String,
    beats: Vec<i32>,
}

fn track() -> Track {
    Track {
        title: String::from("intro"),
        beats: vec![1, 2, 3],
    }
}

fn serializer(ron: &str) -> Serializer {
    let options: SerializerOptions = ron::from_str(ron).unwrap();
    Serializer::new(SerializerSettings::from_options(options))
}

fn write(serializer: &Serializer) -> String {
    let mut buffer = EventBuffer::new();
    serializer.serialize(&track(), &mut buffer).unwrap();
    buffer.to_test_events()
}

#[test]
fn options_from_ron() {
    let options: SerializerOptions = ron::from_str(
        "(
            member_mask: 5,
            emit_tags: false,
            sort_members: false,
            default_style: Block,
            flow_primitive_sequence_limit: 8,
        )",
    )
    .unwrap();

    assert_eq!(options.member_mask, 5);
    assert!(!options.emit_tags);
    assert!(!options.sort_members);
    assert_eq!(options.default_style, DataStyle::Block);
    assert_eq!(options.flow_primitive_sequence_limit, 8);
    assert!(!options.error_tolerant);
    assert!(!options.ignore_unmatched_members);
}

#[test]
fn document_markers() {
    let serializer = serializer("(emit_document_markers: true)");
    let text = write(&serializer);
    assert!(text.starts_with("+STR\n+DOC ---\n"));
    assert!(text.ends_with("-DOC ...\n-STR\n"));

    let mut buffer = EventBuffer::from_test_events(&text).unwrap();
    let read = serializer.deserialize(&mut buffer, None).unwrap();
    assert_eq!(read.value.downcast_ref::<Track>(), Some(&track()));
}

#[test]
fn tags_can_be_disabled() {
    let tagged = write(&serializer("()"));
    assert!(tagged.contains("+MAP <!options::Track>"));

    let untagged = write(&serializer("(emit_tags: false)"));
    assert!(untagged.contains("+MAP\n"));
    assert!(!untagged.contains('<'));
}

#[test]
fn short_scalar_sequences_use_flow() {
    assert!(write(&serializer("(flow_primitive_sequence_limit: 3)")).contains("+SEQ []\n"));

    let block = write(&serializer("(flow_primitive_sequence_limit: 2)"));
    assert!(block.contains("+SEQ\n"));
    assert!(!block.contains("+SEQ []"));
}

#[test]
fn default_style_applies_to_mappings() {
    let text = write(&serializer("(default_style: Flow)"));
    assert!(text.contains("+MAP {} <!options::Track>"));
}

#[test]
fn member_order_follows_declaration_when_unsorted() {
    let sorted = write(&serializer("()"));
    let unsorted = write(&serializer("(sort_members: false)"));

    let position = |text: &str, key: &str| text.find(&format!("=VAL :{key}\n")).unwrap();
    assert!(position(&sorted, "beats") < position(&sorted, "title"));
    assert!(position(&unsorted, "title") < position(&unsorted, "beats"));
}

const WITH_EXTRA: &str = "\
+MAP
=VAL :title
=VAL :outro
=VAL :tempo
+MAP
=VAL :bpm
=VAL :120
-MAP
-MAP
";

#[test]
fn unmatched_members_fail_by_default() {
    let serializer = serializer("()");
    let mut buffer = EventBuffer::from_test_events(WITH_EXTRA).unwrap();

    let err = serializer.deserialize_as::<Track>(&mut buffer).unwrap_err();
    let err = err.as_format().unwrap();
    assert!(err.message().contains("no member named `tempo`"));
    assert_eq!(err.start().line, 4);
}

#[test]
fn unmatched_members_can_be_ignored() {
    let serializer = serializer("(ignore_unmatched_members: true)");
    let mut buffer = EventBuffer::from_test_events(WITH_EXTRA).unwrap();

    let read: Track = serializer.deserialize_as(&mut buffer).unwrap();
    assert_eq!(read.title, "outro");
    assert!(read.beats.is_empty());
}
