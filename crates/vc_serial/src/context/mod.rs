//! Per-operation state of a read or write pass.

// -----------------------------------------------------------------------------
// Modules

mod object_context;
mod replay;
mod serializer_context;

// -----------------------------------------------------------------------------
// Exports

pub use object_context::{ObjectContext, ReadOutcome};
pub use replay::ReplayReader;
pub use serializer_context::SerializerContext;
