//! A tagged object-graph serialization engine.
//!
//! Values are converted to and from a YAML-like event stream of scalars,
//! mappings and sequences carrying type tags:
//!
//! - [`info`]: static type information, see [`derive::Typed`].
//! - [`attributes`]: declared and registered member/type attributes.
//! - [`descriptor`]: the serialization view of types and members.
//! - [`registry`]: tags, type names and assemblies.
//! - [`serializers`]: serializers and their selection.
//! - [`context`]: the state of a read or write pass.
//! - [`serializer`]: document-level entry points.
//!
//! Text is out of scope: an [`event::EventReader`] and an
//! [`event::EventWriter`] stand for the parser and the emitter.

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names `::vc_serial`, which must also resolve inside this
// crate's own tests.
extern crate self as vc_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod impls;

pub mod attributes;
pub mod backend;
pub mod context;
pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod event;
pub mod info;
pub mod object_factory;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod serializers;
pub mod settings;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{ConfigurationError, FormatError, SerialError};
pub use serializer::{DeserializeReport, Deserialized, Serializer};

/// Derive macros, see [`Typed`](derive::Typed).
pub mod derive {
    pub use vc_serial_derive::Typed;
}

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::borrow::Cow;
    pub use alloc::boxed::Box;
    pub use alloc::format;
    pub use alloc::string::String;
    pub use alloc::vec::Vec;
    pub use core::any::Any;

    #[cfg(feature = "auto_register")]
    pub use inventory;
}

/// Submits a serializer factory constructor for [`Assembly::collect`].
///
/// ```
/// use std::sync::Arc;
/// use vc_serial::context::SerializerContext;
/// use vc_serial::descriptor::TypeDescriptor;
/// use vc_serial::serializers::{SerializerFactory, YamlSerializable};
///
/// struct Nothing;
///
/// impl SerializerFactory for Nothing {
///     fn try_create(
///         &self,
///         _: &SerializerContext<'_>,
///         _: &TypeDescriptor,
///     ) -> Option<Arc<dyn YamlSerializable>> {
///         None
///     }
/// }
///
/// vc_serial::register_factory!(|| Ok(Arc::new(Nothing) as Arc<dyn SerializerFactory>));
///
/// fn main() {
///     let assembly = vc_serial::registry::Assembly::collect(env!("CARGO_PKG_NAME"));
///     let settings = vc_serial::settings::SerializerSettings::new();
///     assert_eq!(settings.register_assembly(assembly).factories.len(), 1);
/// }
/// ```
///
/// [`Assembly::collect`]: crate::registry::Assembly::collect
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_factory {
    ($constructor:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegisterFactory {
                crate_name: ::core::env!("CARGO_PKG_NAME"),
                constructor: $constructor,
            }
        }
    };
}
