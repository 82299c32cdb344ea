use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// ScalarParseError

/// Text could not be converted to a scalar.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ScalarParseError(pub String);

// -----------------------------------------------------------------------------
// BinaryLayout

/// Fixed-width little-endian layout of a scalar, used by binary members.
#[derive(Clone, Copy)]
pub struct BinaryLayout {
    /// Width in bytes.
    pub width: usize,
    /// Appends the bytes of a value. Returns `false` if it has the wrong type.
    pub write: fn(&dyn Any, &mut Vec<u8>) -> bool,
    /// Reads a value from exactly `width` bytes.
    pub read: fn(&[u8]) -> Option<Box<dyn Any>>,
}

impl fmt::Debug for BinaryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryLayout")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ScalarInfo

/// A value written as a single scalar node.
pub struct ScalarInfo {
    format: fn(&dyn Any) -> Option<String>,
    parse: fn(&str) -> Result<Box<dyn Any>, ScalarParseError>,
    binary: Option<BinaryLayout>,
}

impl ScalarInfo {
    /// - `format`: text of a value, `None` if it has the wrong type.
    /// - `parse`: value of a text.
    pub fn new(
        format: fn(&dyn Any) -> Option<String>,
        parse: fn(&str) -> Result<Box<dyn Any>, ScalarParseError>,
    ) -> Self {
        Self {
            format,
            parse,
            binary: None,
        }
    }

    pub fn with_binary(mut self, layout: BinaryLayout) -> Self {
        self.binary = Some(layout);
        self
    }

    #[inline]
    pub fn format(&self, value: &dyn Any) -> Option<String> {
        (self.format)(value)
    }

    #[inline]
    pub fn parse(&self, text: &str) -> Result<Box<dyn Any>, ScalarParseError> {
        (self.parse)(text)
    }

    #[inline]
    pub fn binary(&self) -> Option<&BinaryLayout> {
        self.binary.as_ref()
    }
}

impl fmt::Debug for ScalarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarInfo")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}
