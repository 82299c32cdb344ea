//! Derive macros of `vc_serial`, see [`Typed`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Derive `Typed`
///
/// Implements `TypePath` and `Typed`.
///
/// - Structs with named fields become objects, one field per member. A unit
///   struct is an object without members.
/// - Enums with unit variants only become scalars written as the variant
///   name.
///
/// Every field type, and every type parameter, must implement `Typed`.
///
/// The type path defaults to `module_path!()::Name`, with generic arguments
/// in square brackets: `demo::Pair[u8,String]`.
///
/// ## Type attributes
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | `type_path = "module::Name"` | Custom path, generic arguments are still appended |
/// | `tag = "!name"` | Canonical tag, imported when the type is registered |
/// | `tag_alias = "!old"` | Additional tag, sets the remap flag when read |
/// | `style = Flow` | Default style of the mapping or sequence |
/// | `default` | Uses `Default` as constructor, required to read objects |
/// | `compiler_generated` | The type never gets a tag on output |
/// | `auto_register` | Submits the type for `Assembly::collect`, ignored for generic types |
/// | `@expr` | Custom attribute, any `Send + Sync + 'static` value |
///
/// ## Field attributes
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | `rename = "name"` | Serialized name |
/// | `alias = "old"` | Additional name accepted on read, repeatable |
/// | `order = -1` | Explicit position, members without one come after |
/// | `mode = Content` | `Default`, `Assign`, `Content`, `Binary` or `Never` |
/// | `mask = 2` | Member mask |
/// | `style = Flow` | Style of the value |
/// | `should_serialize = path` | `fn(&FieldType) -> bool`, `false` skips the member on write |
/// | `skip` | Removes the member from the descriptor |
/// | `readonly` | No setter, the value is filled in place |
/// | `base` | The field holds the base type, its members are flattened |
/// | `@expr` | Custom attribute |
///
/// Unit variants accept `rename` and `alias`.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(Typed, Default)]
/// #[serial(default, tag = "!enemy")]
/// struct Enemy {
///     #[serial(base)]
///     base: Actor,
///     #[serial(rename = "hp", alias = "health")]
///     health: u32,
///     #[serial(mode = Binary)]
///     path: Vec<f32>,
/// }
/// ```
#[proc_macro_derive(Typed, attributes(serial))]
pub fn derive_typed(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match impls::derive_typed(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
