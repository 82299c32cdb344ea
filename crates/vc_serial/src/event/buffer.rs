use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::{FormatError, SerialError};
use crate::event::{CollectionStart, DataStyle, Event, EventReader, EventWriter};
use crate::event::{Mark, ParsedEvent, ScalarEvent, ScalarStyle};

// -----------------------------------------------------------------------------
// EventBuffer

/// An in-memory event stream, readable and writable.
///
/// Events are stored in emission order. Reading starts at the first event,
/// [`rewind`](Self::rewind) moves the cursor back.
///
/// The buffer converts from and to the line-based notation of the YAML test
/// suite, one event per line:
///
/// ```
/// use vc_serial::event::{EventBuffer, EventReader};
///
/// let text = "\
/// +STR
/// +DOC
/// +MAP <!!Point>
/// =VAL :x
/// =VAL :1
/// -MAP
/// -DOC
/// -STR
/// ";
///
/// let buffer = EventBuffer::from_test_events(text).unwrap();
/// assert_eq!(buffer.len(), 8);
/// assert_eq!(buffer.current().unwrap().start.line, 1);
/// assert_eq!(buffer.to_test_events(), text);
/// ```
#[derive(Debug, Default, Clone)]
pub struct EventBuffer {
    events: Vec<ParsedEvent>,
    cursor: usize,
}

impl EventBuffer {
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor: 0,
        }
    }

    /// A buffer of events without positions.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().map(ParsedEvent::unmarked).collect(),
            cursor: 0,
        }
    }

    pub fn from_parsed(events: Vec<ParsedEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|parsed| &parsed.event)
    }

    pub fn parsed(&self) -> &[ParsedEvent] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Moves the read cursor back to the first event.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    /// Parses the test-event notation.
    ///
    /// Blank lines are ignored. The line number of each event becomes its
    /// start and end mark.
    pub fn from_test_events(text: &str) -> Result<Self, FormatError> {
        let mut events = Vec::new();
        let mut index = 0;

        for (number, line) in text.split('\n').enumerate() {
            let mark = Mark::new(index, number + 1, 1);
            index += line.len() + 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let event = parse_line(line).map_err(|message| FormatError::new(mark, mark, message))?;
            events.push(ParsedEvent::new(event, mark, mark));
        }

        Ok(Self::from_parsed(events))
    }

    /// Renders the events in the test-event notation, one per line.
    pub fn to_test_events(&self) -> String {
        let mut out = String::new();
        for event in self.events() {
            render_event(&mut out, event);
            out.push('\n');
        }
        out
    }
}

impl EventReader for EventBuffer {
    #[inline]
    fn current(&self) -> Option<&ParsedEvent> {
        self.events.get(self.cursor)
    }

    fn move_next(&mut self) -> Result<bool, SerialError> {
        if self.cursor < self.events.len() {
            self.cursor += 1;
        }
        Ok(self.cursor < self.events.len())
    }
}

impl EventWriter for EventBuffer {
    fn emit(&mut self, event: Event) -> Result<(), SerialError> {
        self.events.push(ParsedEvent::unmarked(event));
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Test-event notation

fn parse_line(line: &str) -> Result<Event, String> {
    let line = line.trim_start();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));

    Ok(match head {
        "+STR" => Event::StreamStart,
        "-STR" => Event::StreamEnd,
        "+DOC" => Event::DocumentStart {
            implicit: rest.trim() != "---",
        },
        "-DOC" => Event::DocumentEnd {
            implicit: rest.trim() != "...",
        },
        "-MAP" => Event::MappingEnd,
        "-SEQ" => Event::SequenceEnd,
        "+MAP" => Event::MappingStart(parse_collection(rest, "{}")?),
        "+SEQ" => Event::SequenceStart(parse_collection(rest, "[]")?),
        "=ALI" => match rest.trim().strip_prefix('*') {
            Some(anchor) if !anchor.is_empty() => Event::Alias {
                anchor: anchor.into(),
            },
            _ => return Err(format!("malformed alias `{line}`")),
        },
        "=VAL" => Event::Scalar(parse_scalar(rest)?),
        _ => return Err(format!("unknown event `{head}`")),
    })
}

/// Splits off leading `&anchor` and `<tag>` properties.
fn parse_properties(mut rest: &str) -> Result<(Option<String>, Option<String>, &str), String> {
    let mut anchor = None;
    let mut tag = None;

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix('&') {
            let end = after.find(' ').unwrap_or(after.len());
            anchor = Some(after[..end].into());
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('<') {
            let end = after
                .find('>')
                .ok_or_else(|| format!("unterminated tag in `{rest}`"))?;
            tag = Some(after[..end].into());
            rest = &after[end + 1..];
        } else {
            return Ok((anchor, tag, rest));
        }
    }
}

fn parse_collection(rest: &str, flow: &str) -> Result<CollectionStart, String> {
    let rest = rest.trim_start();
    let (style, rest) = match rest.strip_prefix(flow) {
        Some(after) => (DataStyle::Flow, after),
        None => (DataStyle::Any, rest),
    };
    let (anchor, tag, rest) = parse_properties(rest)?;
    if !rest.trim().is_empty() {
        return Err(format!("unexpected `{}` after collection start", rest.trim()));
    }
    Ok(CollectionStart { anchor, tag, style })
}

fn parse_scalar(rest: &str) -> Result<ScalarEvent, String> {
    let (anchor, tag, rest) = parse_properties(rest)?;
    let mut chars = rest.chars();
    let style = match chars.next() {
        Some(':') => ScalarStyle::Plain,
        Some('\'') => ScalarStyle::SingleQuoted,
        Some('"') => ScalarStyle::DoubleQuoted,
        Some('|') => ScalarStyle::Literal,
        Some('>') => ScalarStyle::Folded,
        _ => return Err(format!("missing scalar style in `{rest}`")),
    };

    Ok(ScalarEvent {
        anchor,
        tag,
        value: unescape(chars.as_str()),
        style,
    })
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn render_properties(out: &mut String, anchor: Option<&str>, tag: Option<&str>) {
    if let Some(anchor) = anchor {
        let _ = write!(out, " &{anchor}");
    }
    if let Some(tag) = tag {
        let _ = write!(out, " <{tag}>");
    }
}

fn render_event(out: &mut String, event: &Event) {
    match event {
        Event::StreamStart => out.push_str("+STR"),
        Event::StreamEnd => out.push_str("-STR"),
        Event::DocumentStart { implicit } => {
            out.push_str(if *implicit { "+DOC" } else { "+DOC ---" });
        }
        Event::DocumentEnd { implicit } => {
            out.push_str(if *implicit { "-DOC" } else { "-DOC ..." });
        }
        Event::Alias { anchor } => {
            let _ = write!(out, "=ALI *{anchor}");
        }
        Event::MappingStart(start) | Event::SequenceStart(start) => {
            let (head, flow) = match event {
                Event::MappingStart(_) => ("+MAP", " {}"),
                _ => ("+SEQ", " []"),
            };
            out.push_str(head);
            if start.style == DataStyle::Flow {
                out.push_str(flow);
            }
            render_properties(out, start.anchor.as_deref(), start.tag.as_deref());
        }
        Event::MappingEnd => out.push_str("-MAP"),
        Event::SequenceEnd => out.push_str("-SEQ"),
        Event::Scalar(scalar) => {
            out.push_str("=VAL");
            render_properties(out, scalar.anchor.as_deref(), scalar.tag.as_deref());
            out.push(' ');
            out.push(match scalar.style {
                ScalarStyle::Any | ScalarStyle::Plain => ':',
                ScalarStyle::SingleQuoted => '\'',
                ScalarStyle::DoubleQuoted => '"',
                ScalarStyle::Literal => '|',
                ScalarStyle::Folded => '>',
            });
            for c in scalar.value.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    '\0' => out.push_str("\\0"),
                    c => out.push(c),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventReaderExt;

    #[test]
    fn parses_properties_and_styles() {
        let buffer = EventBuffer::from_test_events(
            "+SEQ [] &list <!tag>\n=VAL &a <!!str> \"quoted\\nline\n=ALI *a\n-SEQ\n",
        )
        .unwrap();

        let events: Vec<_> = buffer.events().cloned().collect();
        assert_eq!(
            events[0],
            Event::SequenceStart(CollectionStart {
                anchor: Some("list".into()),
                tag: Some("!tag".into()),
                style: DataStyle::Flow,
            })
        );
        let Event::Scalar(scalar) = &events[1] else {
            panic!("expected a scalar");
        };
        assert_eq!(scalar.anchor.as_deref(), Some("a"));
        assert_eq!(scalar.tag.as_deref(), Some("!!str"));
        assert_eq!(scalar.value, "quoted\nline");
        assert_eq!(scalar.style, ScalarStyle::DoubleQuoted);
        assert_eq!(events[2], Event::Alias { anchor: "a".into() });
    }

    #[test]
    fn empty_plain_scalar() {
        let buffer = EventBuffer::from_test_events("=VAL :").unwrap();
        assert_eq!(
            buffer.events().next(),
            Some(&Event::Scalar(ScalarEvent::plain("")))
        );
    }

    #[test]
    fn reports_the_failing_line() {
        let err = EventBuffer::from_test_events("+STR\n+WAT\n").unwrap_err();
        assert_eq!(err.start().line, 2);
        assert!(err.message().contains("+WAT"));
    }

    #[test]
    fn skip_node_consumes_children() {
        let mut buffer = EventBuffer::from_test_events(
            "+MAP\n=VAL :a\n+SEQ\n=VAL :1\n-SEQ\n-MAP\n=VAL :after\n",
        )
        .unwrap();

        buffer.skip_node().unwrap();
        let Event::Scalar(scalar) = &buffer.expect_current().unwrap().event else {
            panic!("expected a scalar");
        };
        assert_eq!(scalar.value, "after");
    }

    #[test]
    fn writer_appends() {
        let mut buffer = EventBuffer::new();
        buffer.emit(Event::StreamStart).unwrap();
        buffer.emit(Event::Scalar(ScalarEvent::plain("1"))).unwrap();
        assert_eq!(buffer.to_test_events(), "+STR\n=VAL :1\n");
    }
}
