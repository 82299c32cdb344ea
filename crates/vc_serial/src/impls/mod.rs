//! [`Typed`](crate::info::Typed) for built-in types.
//!
//! - scalars: `bool`, `char`, `i8`-`i128`, `isize`, `u8`-`u128`, `usize`,
//!   `f32`, `f64`, `String`, `()`
//! - collections: `Vec<T>` (written `T[]`), `VecDeque<T>`
//! - dictionaries: `std::collections::HashMap<K, V>`, `BTreeMap<K, V>`,
//!   `vc_utils::hash::HashMap<K, V>`
//! - `Option<T>` as a nullable value
//! - `Box<dyn Any>` as a polymorphic slot

// -----------------------------------------------------------------------------
// Modules

mod boxed;
mod collections;
mod option;
mod scalar;
