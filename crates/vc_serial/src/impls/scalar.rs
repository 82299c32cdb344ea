use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::any::{Any, type_name};
use core::fmt::Display;
use core::str::FromStr;

use crate::info::{BinaryLayout, NonGenericTypeInfoCell, ScalarInfo, ScalarParseError};
use crate::info::{TypeInfo, TypeKind, TypePath, Typed};

// -----------------------------------------------------------------------------
// Helpers

fn format_display<T: Any + Display>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(ToString::to_string)
}

fn parse_from_str<T: Any + FromStr>(text: &str) -> Result<Box<dyn Any>, ScalarParseError>
where
    T::Err: Display,
{
    match text.trim().parse::<T>() {
        Ok(value) => Ok(Box::new(value)),
        Err(err) => Err(ScalarParseError(format!(
            "`{text}` is not a valid `{}`: {err}",
            type_name::<T>()
        ))),
    }
}

macro_rules! impl_scalar_path {
    ($ty:ty, $name:expr) => {
        impl TypePath for $ty {
            fn type_path() -> &'static str {
                $name
            }
            fn type_name() -> &'static str {
                $name
            }
            fn type_ident() -> &'static str {
                $name
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Numbers

macro_rules! impl_integer {
    ($($ty:ident),* $(,)?) => {$(
        impl_scalar_path!($ty, stringify!($ty));

        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    let scalar = ScalarInfo::new(format_display::<$ty>, parse_from_str::<$ty>)
                        .with_binary(BinaryLayout {
                            width: core::mem::size_of::<$ty>(),
                            write: |value, out| match value.downcast_ref::<$ty>() {
                                Some(value) => {
                                    out.extend_from_slice(&value.to_le_bytes());
                                    true
                                }
                                None => false,
                            },
                            read: |bytes| {
                                let bytes = <[u8; core::mem::size_of::<$ty>()]>::try_from(bytes).ok()?;
                                Some(Box::new(<$ty>::from_le_bytes(bytes)) as Box<dyn Any>)
                            },
                        });
                    TypeInfo::new::<$ty>(TypeKind::Scalar(scalar)).with_default::<$ty>()
                })
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_float {
    ($($ty:ident),* $(,)?) => {$(
        impl_scalar_path!($ty, stringify!($ty));

        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    let scalar = ScalarInfo::new(
                        |value| {
                            let value = *value.downcast_ref::<$ty>()?;
                            Some(if value.is_nan() {
                                String::from(".nan")
                            } else if value.is_infinite() {
                                String::from(if value > 0.0 { ".inf" } else { "-.inf" })
                            } else {
                                value.to_string()
                            })
                        },
                        |text| match text.trim() {
                            ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
                                Ok(Box::new(<$ty>::INFINITY))
                            }
                            "-.inf" | "-.Inf" | "-.INF" => Ok(Box::new(<$ty>::NEG_INFINITY)),
                            ".nan" | ".NaN" | ".NAN" => Ok(Box::new(<$ty>::NAN)),
                            _ => parse_from_str::<$ty>(text),
                        },
                    )
                    .with_binary(BinaryLayout {
                        width: core::mem::size_of::<$ty>(),
                        write: |value, out| match value.downcast_ref::<$ty>() {
                            Some(value) => {
                                out.extend_from_slice(&value.to_le_bytes());
                                true
                            }
                            None => false,
                        },
                        read: |bytes| {
                            let bytes = <[u8; core::mem::size_of::<$ty>()]>::try_from(bytes).ok()?;
                            Some(Box::new(<$ty>::from_le_bytes(bytes)) as Box<dyn Any>)
                        },
                    });
                    TypeInfo::new::<$ty>(TypeKind::Scalar(scalar)).with_default::<$ty>()
                })
            }
        }
    )*};
}

impl_float!(f32, f64);

// -----------------------------------------------------------------------------
// bool, char, String, ()

impl_scalar_path!(bool, "bool");

impl Typed for bool {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            let scalar = ScalarInfo::new(format_display::<bool>, |text| match text.trim() {
                "true" | "True" | "TRUE" => Ok(Box::new(true)),
                "false" | "False" | "FALSE" => Ok(Box::new(false)),
                other => Err(ScalarParseError(format!("`{other}` is not a valid `bool`"))),
            })
            .with_binary(BinaryLayout {
                width: 1,
                write: |value, out| match value.downcast_ref::<bool>() {
                    Some(value) => {
                        out.push(u8::from(*value));
                        true
                    }
                    None => false,
                },
                read: |bytes| match bytes {
                    [byte] => Some(Box::new(*byte != 0) as Box<dyn Any>),
                    _ => None,
                },
            });
            TypeInfo::new::<bool>(TypeKind::Scalar(scalar)).with_default::<bool>()
        })
    }
}

impl_scalar_path!(char, "char");

impl Typed for char {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            let scalar = ScalarInfo::new(format_display::<char>, |text| {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Box::new(c)),
                    _ => Err(ScalarParseError(format!(
                        "`{text}` is not a single character"
                    ))),
                }
            });
            TypeInfo::new::<char>(TypeKind::Scalar(scalar)).with_default::<char>()
        })
    }
}

impl TypePath for String {
    fn type_path() -> &'static str {
        "String"
    }
    fn type_name() -> &'static str {
        "String"
    }
    fn type_ident() -> &'static str {
        "String"
    }
    fn module_path() -> Option<&'static str> {
        Some("alloc::string")
    }
}

impl Typed for String {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            let scalar = ScalarInfo::new(
                |value| value.downcast_ref::<String>().cloned(),
                |text| Ok(Box::new(String::from(text))),
            );
            TypeInfo::new::<String>(TypeKind::Scalar(scalar)).with_default::<String>()
        })
    }
}

impl_scalar_path!((), "()");

impl Typed for () {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            let scalar = ScalarInfo::new(
                |value| value.is::<()>().then(|| String::from("null")),
                |text| match text.trim() {
                    "" | "~" | "null" | "Null" | "NULL" => Ok(Box::new(())),
                    other => Err(ScalarParseError(format!("`{other}` is not null"))),
                },
            );
            TypeInfo::new::<()>(TypeKind::Scalar(scalar)).with_default::<()>()
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::Typed;

    #[test]
    fn floats_use_yaml_special_values() {
        let scalar = f64::type_info().as_scalar().unwrap();
        assert_eq!(scalar.format(&f64::INFINITY).as_deref(), Some(".inf"));
        assert_eq!(scalar.format(&f64::NEG_INFINITY).as_deref(), Some("-.inf"));
        assert_eq!(scalar.format(&1.5_f64).as_deref(), Some("1.5"));

        let nan = scalar.parse(".nan").unwrap();
        assert!(nan.downcast_ref::<f64>().unwrap().is_nan());
    }

    #[test]
    fn integers_reject_garbage() {
        let scalar = i32::type_info().as_scalar().unwrap();
        assert_eq!(*scalar.parse(" 42").unwrap().downcast::<i32>().unwrap(), 42);
        let err = scalar.parse("4x2").unwrap_err();
        assert!(err.to_string().contains("4x2"));
    }

    #[test]
    fn binary_layout_is_little_endian() {
        let layout = *u16::type_info().as_scalar().unwrap().binary().unwrap();
        let mut bytes = Vec::new();
        assert!((layout.write)(&0x0102_u16, &mut bytes));
        assert_eq!(bytes, [0x02, 0x01]);
        let back = (layout.read)(&bytes).unwrap();
        assert_eq!(*back.downcast::<u16>().unwrap(), 0x0102);
        assert!(!(layout.write)(&1_u32, &mut bytes));
    }

    #[test]
    fn char_needs_exactly_one_character() {
        let scalar = char::type_info().as_scalar().unwrap();
        assert_eq!(*scalar.parse("a").unwrap().downcast::<char>().unwrap(), 'a');
        assert!(scalar.parse("ab").is_err());
        assert!(scalar.parse("").is_err());
    }
}
