use serde::{Deserialize, Serialize};

/// Presentation of a scalar node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// Left to the writer.
    #[default]
    Any,
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Quoted scalars never resolve implicitly to anything but a string.
    #[inline]
    pub fn is_quoted(self) -> bool {
        !matches!(self, Self::Any | Self::Plain)
    }
}

/// Presentation of a mapping or sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataStyle {
    /// Left to the member, the type or the settings, in that order.
    #[default]
    Any,
    Block,
    Flow,
}
