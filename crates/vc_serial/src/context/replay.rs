use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_utils::hash::HashMap;

use crate::error::{FormatError, SerialError};
use crate::event::{Event, EventReader, ParsedEvent};

struct Recording {
    anchor: String,
    events: Vec<ParsedEvent>,
    depth: isize,
}

struct Replay {
    events: Arc<[ParsedEvent]>,
    position: usize,
}

// -----------------------------------------------------------------------------
// ReplayReader

/// Wraps a reader and expands aliases.
///
/// Anchored nodes are recorded as they are consumed. When the cursor lands
/// on an `*alias`, the recorded events of its anchor are replayed in its
/// place, so consumers never observe alias events.
pub struct ReplayReader<'a> {
    inner: &'a mut dyn EventReader,
    anchors: HashMap<String, Arc<[ParsedEvent]>>,
    recordings: Vec<Recording>,
    replays: Vec<Replay>,
}

impl<'a> ReplayReader<'a> {
    pub fn new(inner: &'a mut dyn EventReader) -> Result<Self, SerialError> {
        let mut reader = Self {
            inner,
            anchors: HashMap::default(),
            recordings: Vec::new(),
            replays: Vec::new(),
        };
        reader.expand_aliases()?;
        Ok(reader)
    }

    /// Whether an alias is being replayed.
    pub fn is_replaying(&self) -> bool {
        !self.replays.is_empty()
    }

    fn record(&mut self, parsed: &ParsedEvent) {
        if let Some(anchor) = parsed.event.anchor() {
            self.recordings.push(Recording {
                anchor: anchor.into(),
                events: Vec::new(),
                depth: 0,
            });
        }
        if self.recordings.is_empty() {
            return;
        }

        let delta = parsed.event.depth_delta();
        for recording in &mut self.recordings {
            recording.events.push(parsed.clone());
            recording.depth += delta;
        }
        while self.recordings.last().is_some_and(|r| r.depth == 0) {
            if let Some(done) = self.recordings.pop() {
                self.anchors.insert(done.anchor, done.events.into());
            }
        }
    }

    /// Replaces an alias under the cursor by the events of its anchor.
    fn expand_aliases(&mut self) -> Result<(), SerialError> {
        while let Some(parsed) = self.current()
            && let Event::Alias { anchor } = &parsed.event
        {
            let Some(events) = self.anchors.get(anchor).cloned() else {
                return Err(FormatError::new(
                    parsed.start,
                    parsed.end,
                    format!("alias `*{anchor}` refers to an unknown anchor"),
                )
                .into());
            };
            self.step()?;
            self.replays.push(Replay {
                events,
                position: 0,
            });
        }
        Ok(())
    }

    /// Advances without alias expansion.
    fn step(&mut self) -> Result<(), SerialError> {
        match self.replays.last_mut() {
            Some(replay) => {
                replay.position += 1;
                if replay.position == replay.events.len() {
                    self.replays.pop();
                }
            }
            None => {
                self.inner.move_next()?;
            }
        }
        Ok(())
    }
}

impl EventReader for ReplayReader<'_> {
    fn current(&self) -> Option<&ParsedEvent> {
        match self.replays.last() {
            Some(replay) => replay.events.get(replay.position),
            None => self.inner.current(),
        }
    }

    fn move_next(&mut self) -> Result<bool, SerialError> {
        if let Some(parsed) = self.current().cloned() {
            self.record(&parsed);
            self.step()?;
        }
        self.expand_aliases()?;
        Ok(self.current().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBuffer, EventReaderExt, EventWriter};

    fn drain(reader: &mut ReplayReader<'_>) -> String {
        let mut buffer = EventBuffer::new();
        while let Some(parsed) = reader.current() {
            let event = parsed.event.clone();
            buffer.emit(event).unwrap();
            reader.move_next().unwrap();
        }
        buffer.to_test_events()
    }

    #[test]
    fn aliases_replay_anchored_nodes() {
        let mut source = EventBuffer::from_test_events(
            "+SEQ\n+MAP &p\n=VAL :x\n=VAL :1\n-MAP\n=ALI *p\n=VAL &s :s\n=ALI *s\n-SEQ\n",
        )
        .unwrap();
        let mut reader = ReplayReader::new(&mut source).unwrap();

        assert_eq!(
            drain(&mut reader),
            "+SEQ\n+MAP &p\n=VAL :x\n=VAL :1\n-MAP\n+MAP &p\n=VAL :x\n=VAL :1\n-MAP\n\
             =VAL &s :s\n=VAL &s :s\n-SEQ\n"
        );
    }

    #[test]
    fn unknown_anchor() {
        let mut source = EventBuffer::from_test_events("+SEQ\n=ALI *nope\n-SEQ\n").unwrap();
        let mut reader = ReplayReader::new(&mut source).unwrap();
        let err = reader.move_next().unwrap_err();
        let err = err.as_format().unwrap();
        assert_eq!(err.start().line, 2);
        assert!(err.message().contains("nope"));
    }

    #[test]
    fn skip_node_sees_replayed_events() {
        let mut source =
            EventBuffer::from_test_events("+SEQ\n+SEQ &a\n=VAL :1\n-SEQ\n=ALI *a\n=VAL :end\n-SEQ\n").unwrap();
        let mut reader = ReplayReader::new(&mut source).unwrap();
        reader.move_next().unwrap();
        reader.skip_node().unwrap();
        assert!(reader.is_replaying());
        reader.skip_node().unwrap();
        assert!(!reader.is_replaying());
        let Event::Scalar(scalar) = &reader.expect_current().unwrap().event else {
            panic!("expected a scalar");
        };
        assert_eq!(scalar.value, "end");
    }
}
