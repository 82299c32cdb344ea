//! Error taxonomy.
//!
//! - [`FormatError`]: the document does not match what the reader expects.
//!   Carries the position of the offending node.
//! - [`ConfigurationError`]: a registration or setup mistake.
//! - [`SerialError`]: everything a read or write pass can return.
//!
//! Lookup failures (no serializer, unresolved tag) reach the caller as
//! [`FormatError`]s through [`SerializerContext::read_yaml`], unless the
//! context is error tolerant.
//!
//! [`SerializerContext::read_yaml`]: crate::context::SerializerContext::read_yaml

use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error;

use thiserror::Error;

use crate::event::Mark;

// -----------------------------------------------------------------------------
// FormatError

/// The document shape does not match the expected model.
///
/// ```
/// use vc_serial::error::FormatError;
/// use vc_serial::event::Mark;
///
/// let mark = Mark { index: 12, line: 3, column: 1 };
/// let err = FormatError::new(mark, mark, "unable to resolve tag `!Widget`");
///
/// assert_eq!(err.to_string(), "unable to resolve tag `!Widget` (line 3, column 1)");
/// ```
#[derive(Debug, Error)]
#[error("{message} ({start})")]
pub struct FormatError {
    start: Mark,
    end: Mark,
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl FormatError {
    pub fn new(start: Mark, end: Mark, message: impl Into<String>) -> Self {
        Self {
            start,
            end,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the error that caused this one.
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn start(&self) -> Mark {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Mark {
        self.end
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// -----------------------------------------------------------------------------
// ConfigurationError

/// A programming mistake detected while configuring the engine.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("a tag must not be empty")]
    EmptyTag,
    #[error("tag `{tag}` is the canonical tag of `{existing}` and cannot become an alias")]
    AliasOverCanonical { tag: String, existing: &'static str },
    #[error("a serializer is already bound to `{0}`")]
    SerializerAlreadyBound(&'static str),
    #[error(
        "a value written as {declared} has an unregistered runtime type, \
         register it with `SerializerSettings::register_type` or `SerializerSettings::register_assembly`"
    )]
    UnregisteredType { declared: String },
    #[error("`{0}` has no constructor, derive `Default` and add `#[serial(default)]`")]
    MissingConstructor(&'static str),
    #[error("member `{member}` uses binary mode but `{ty}` is not a flat array of fixed-width scalars")]
    UnsupportedBinary { member: String, ty: &'static str },
    #[error("the context is not bound to a {0}")]
    NotBound(&'static str),
}

// -----------------------------------------------------------------------------
// SerialError

/// Error returned by read and write passes.
#[derive(Debug, Error)]
pub enum SerialError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("no serializer can handle `{0}`")]
    NoSerializer(&'static str),
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    Mismatch { expected: &'static str, found: String },
    #[error("{0}")]
    Custom(String),
}

impl SerialError {
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Returns the [`FormatError`] when this is one.
    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }
}
