use crate::info::{TypeInfo, TypePath};

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to a type's [`TypeInfo`].
///
/// Usually derived:
///
/// ```
/// use vc_serial::derive::Typed;
/// use vc_serial::info::Typed as _;
///
/// #[derive(Typed, Default)]
/// #[serial(default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let object = Point::type_info().as_object().unwrap();
/// assert_eq!(object.fields().len(), 2);
/// ```
///
/// Hand-written implementations store the info in a
/// [`NonGenericTypeInfoCell`] or, for generic types, a
/// [`GenericTypeInfoCell`].
///
/// [`NonGenericTypeInfoCell`]: crate::info::NonGenericTypeInfoCell
/// [`GenericTypeInfoCell`]: crate::info::GenericTypeInfoCell
pub trait Typed: TypePath {
    fn type_info() -> &'static TypeInfo;
}
