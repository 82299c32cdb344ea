//! The event model exchanged with readers and writers.
//!
//! The engine never sees text: a reader hands it [`ParsedEvent`]s, a writer
//! receives [`Event`]s. [`EventBuffer`] is an in-memory implementation of
//! both sides that also speaks the line-based test-event notation.

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod event;
mod mark;
mod reader;
mod style;

// -----------------------------------------------------------------------------
// Exports

pub use buffer::EventBuffer;
pub use event::{CollectionStart, Event, ParsedEvent, ScalarEvent};
pub use mark::Mark;
pub use reader::{EventReader, EventReaderExt, EventWriter};
pub use style::{DataStyle, ScalarStyle};
