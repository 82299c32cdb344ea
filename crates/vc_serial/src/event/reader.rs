use alloc::format;

use crate::error::{FormatError, SerialError};
use crate::event::{Event, Mark, ParsedEvent};

// -----------------------------------------------------------------------------
// EventReader

/// The source side of a read pass.
///
/// A fresh reader is positioned on its first event.
pub trait EventReader {
    /// The event under the cursor, `None` once exhausted.
    fn current(&self) -> Option<&ParsedEvent>;

    /// Advances the cursor, returns whether an event is now current.
    fn move_next(&mut self) -> Result<bool, SerialError>;
}

/// Helpers available on every [`EventReader`].
pub trait EventReaderExt: EventReader {
    /// The current event, or a format error at end of input.
    fn expect_current(&self) -> Result<&ParsedEvent, SerialError> {
        self.current().ok_or_else(|| {
            FormatError::new(Mark::default(), Mark::default(), "unexpected end of events").into()
        })
    }

    /// Returns the current event and advances past it.
    fn take(&mut self) -> Result<ParsedEvent, SerialError> {
        let event = self.expect_current()?.clone();
        self.move_next()?;
        Ok(event)
    }

    /// Consumes the current event if `accept` matches it.
    fn take_if(&mut self, accept: impl FnOnce(&Event) -> bool) -> Result<bool, SerialError> {
        match self.current() {
            Some(parsed) if accept(&parsed.event) => {
                self.move_next()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Consumes the node under the cursor, children included.
    fn skip_node(&mut self) -> Result<(), SerialError> {
        let first = self.take()?;
        if !first.event.is_node_start() {
            return Err(FormatError::new(
                first.start,
                first.end,
                format!("expected a node, found {}", first.event.name()),
            )
            .into());
        }

        let mut depth = first.event.depth_delta();
        while depth > 0 {
            depth += self.take()?.event.depth_delta();
        }
        Ok(())
    }
}

impl<R: EventReader + ?Sized> EventReaderExt for R {}

// -----------------------------------------------------------------------------
// EventWriter

/// The sink side of a write pass.
pub trait EventWriter {
    fn emit(&mut self, event: Event) -> Result<(), SerialError>;
}
