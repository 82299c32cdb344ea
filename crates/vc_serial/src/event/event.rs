use alloc::string::String;

use crate::event::{DataStyle, Mark, ScalarStyle};

// -----------------------------------------------------------------------------
// ScalarEvent

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScalarEvent {
    pub anchor: Option<String>,
    pub tag: Option<String>,
    pub value: String,
    pub style: ScalarStyle,
}

impl ScalarEvent {
    /// An untagged plain scalar.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            style: ScalarStyle::Plain,
            ..Self::default()
        }
    }

    pub fn new(value: impl Into<String>, style: ScalarStyle) -> Self {
        Self {
            value: value.into(),
            style,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

// -----------------------------------------------------------------------------
// CollectionStart

/// Opens a mapping or a sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectionStart {
    pub anchor: Option<String>,
    pub tag: Option<String>,
    pub style: DataStyle,
}

impl CollectionStart {
    pub fn new(tag: Option<String>, style: DataStyle) -> Self {
        Self {
            anchor: None,
            tag,
            style,
        }
    }
}

// -----------------------------------------------------------------------------
// Event

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart { implicit: bool },
    DocumentEnd { implicit: bool },
    /// A reference to a previously anchored node.
    Alias { anchor: String },
    Scalar(ScalarEvent),
    SequenceStart(CollectionStart),
    SequenceEnd,
    MappingStart(CollectionStart),
    MappingEnd,
}

impl Event {
    /// The tag of a node event.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Scalar(scalar) => scalar.tag.as_deref(),
            Self::SequenceStart(start) | Self::MappingStart(start) => start.tag.as_deref(),
            _ => None,
        }
    }

    /// The anchor defined by a node event.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::Scalar(scalar) => scalar.anchor.as_deref(),
            Self::SequenceStart(start) | Self::MappingStart(start) => start.anchor.as_deref(),
            _ => None,
        }
    }

    /// Whether the event begins a node.
    pub fn is_node_start(&self) -> bool {
        matches!(
            self,
            Self::Scalar(_) | Self::Alias { .. } | Self::SequenceStart(_) | Self::MappingStart(_)
        )
    }

    /// Nesting change caused by the event.
    pub(crate) fn depth_delta(&self) -> isize {
        match self {
            Self::SequenceStart(_) | Self::MappingStart(_) => 1,
            Self::SequenceEnd | Self::MappingEnd => -1,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StreamStart => "stream start",
            Self::StreamEnd => "stream end",
            Self::DocumentStart { .. } => "document start",
            Self::DocumentEnd { .. } => "document end",
            Self::Alias { .. } => "alias",
            Self::Scalar(_) => "scalar",
            Self::SequenceStart(_) => "sequence start",
            Self::SequenceEnd => "sequence end",
            Self::MappingStart(_) => "mapping start",
            Self::MappingEnd => "mapping end",
        }
    }
}

// -----------------------------------------------------------------------------
// ParsedEvent

/// An event with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub event: Event,
    pub start: Mark,
    pub end: Mark,
}

impl ParsedEvent {
    pub fn new(event: Event, start: Mark, end: Mark) -> Self {
        Self { event, start, end }
    }

    /// An event without a known position.
    pub fn unmarked(event: Event) -> Self {
        Self::new(event, Mark::default(), Mark::default())
    }
}
