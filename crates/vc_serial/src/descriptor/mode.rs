use serde::{Deserialize, Serialize};

/// How a member value is transferred.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SerializeMode {
    /// [`Assign`](Self::Assign) when the member has a setter,
    /// [`Content`](Self::Content) otherwise.
    #[default]
    Default,
    /// Reads a new value and replaces the member with it.
    Assign,
    /// Reads into the existing member value.
    Content,
    /// Writes a flat array of fixed-width scalars as one `!!binary` scalar.
    Binary,
    /// Never read nor written.
    Never,
}
