use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::binary;
use crate::dynamic::DynamicNode;
use crate::event::ScalarEvent;
use crate::info::{TypeInfo, Typed};
use crate::schema::{ParsedScalar, Schema};

const LONG_PREFIX: &str = "tag:yaml.org,2002:";

// -----------------------------------------------------------------------------
// CoreSchema

/// The YAML 1.2 core schema.
///
/// | Tag        | Type            | Implicit plain forms                    |
/// |------------|-----------------|-----------------------------------------|
/// | `!!null`   | `()`            | empty, `~`, `null`, `Null`, `NULL`      |
/// | `!!bool`   | `bool`          | `true`, `false` and their capitalized forms |
/// | `!!int`    | `i64`           | decimal, `0x` hex, `0o` octal           |
/// | `!!float`  | `f64`           | decimal, exponent, `.inf`, `-.inf`, `.nan` |
/// | `!!str`    | `String`        | everything else, and all quoted scalars |
/// | `!!binary` | `Vec<u8>`       | none                                    |
///
/// `!!map` and `!!seq` stand for untyped mappings and sequences.
///
/// ```
/// use vc_serial::event::ScalarEvent;
/// use vc_serial::schema::{CoreSchema, Schema};
///
/// let schema = CoreSchema;
/// assert_eq!(schema.shorten_tag("tag:yaml.org,2002:int"), "!!int");
///
/// let parsed = schema.try_parse(&ScalarEvent::plain("0x1F"), true).unwrap();
/// assert_eq!(parsed.tag, CoreSchema::INT_TAG);
/// assert_eq!(parsed.value.unwrap().downcast_ref::<i64>(), Some(&31));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreSchema;

impl CoreSchema {
    pub const NULL_TAG: &'static str = "!!null";
    pub const BOOL_TAG: &'static str = "!!bool";
    pub const INT_TAG: &'static str = "!!int";
    pub const FLOAT_TAG: &'static str = "!!float";
    pub const STR_TAG: &'static str = "!!str";
    pub const BINARY_TAG: &'static str = "!!binary";
    pub const MAP_TAG: &'static str = "!!map";
    pub const SEQ_TAG: &'static str = "!!seq";

    fn resolve_implicit(&self, text: &str, parse_value: bool) -> ParsedScalar {
        let value = |value: Box<dyn Any>| parse_value.then_some(value);

        if is_null(text) {
            return ParsedScalar {
                tag: Self::NULL_TAG,
                value: value(Box::new(())),
            };
        }
        if let Some(flag) = parse_bool(text) {
            return ParsedScalar {
                tag: Self::BOOL_TAG,
                value: value(Box::new(flag)),
            };
        }
        if let Some(number) = parse_int(text) {
            return ParsedScalar {
                tag: Self::INT_TAG,
                value: value(Box::new(number)),
            };
        }
        if let Some(number) = parse_float(text) {
            return ParsedScalar {
                tag: Self::FLOAT_TAG,
                value: value(Box::new(number)),
            };
        }
        ParsedScalar {
            tag: Self::STR_TAG,
            value: value(Box::new(String::from(text))),
        }
    }
}

impl Schema for CoreSchema {
    fn shorten_tag<'a>(&self, tag: &'a str) -> Cow<'a, str> {
        match tag.strip_prefix(LONG_PREFIX) {
            Some(rest) => Cow::Owned(alloc::format!("!!{rest}")),
            None => Cow::Borrowed(tag),
        }
    }

    fn expand_tag<'a>(&self, tag: &'a str) -> Cow<'a, str> {
        match tag.strip_prefix("!!") {
            Some(rest) => Cow::Owned(alloc::format!("{LONG_PREFIX}{rest}")),
            None => Cow::Borrowed(tag),
        }
    }

    fn type_for_default_tag(&self, short_tag: &str) -> Option<&'static TypeInfo> {
        Some(match short_tag {
            Self::NULL_TAG => <()>::type_info(),
            Self::BOOL_TAG => bool::type_info(),
            Self::INT_TAG => i64::type_info(),
            Self::FLOAT_TAG => f64::type_info(),
            Self::STR_TAG => String::type_info(),
            Self::BINARY_TAG => <Vec<u8>>::type_info(),
            Self::MAP_TAG | Self::SEQ_TAG => DynamicNode::type_info(),
            _ => return None,
        })
    }

    fn is_schema_tag(&self, short_tag: &str) -> bool {
        matches!(
            short_tag,
            Self::NULL_TAG
                | Self::BOOL_TAG
                | Self::INT_TAG
                | Self::FLOAT_TAG
                | Self::STR_TAG
                | Self::BINARY_TAG
                | Self::MAP_TAG
                | Self::SEQ_TAG
        )
    }

    fn default_tag(&self, ty: TypeId) -> Option<&'static str> {
        macro_rules! any_of {
            ($($ty:ty),+) => { $(ty == TypeId::of::<$ty>())||+ };
        }

        if any_of!(()) {
            Some(Self::NULL_TAG)
        } else if any_of!(bool) {
            Some(Self::BOOL_TAG)
        } else if any_of!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize) {
            Some(Self::INT_TAG)
        } else if any_of!(f32, f64) {
            Some(Self::FLOAT_TAG)
        } else if any_of!(String, char) {
            Some(Self::STR_TAG)
        } else {
            None
        }
    }

    fn try_parse(&self, scalar: &ScalarEvent, parse_value: bool) -> Option<ParsedScalar> {
        let text = scalar.value.as_str();
        let tag = match scalar.tag.as_deref() {
            None if scalar.style.is_quoted() => Self::STR_TAG,
            None => return Some(self.resolve_implicit(text, parse_value)),
            Some("!") => Self::STR_TAG,
            Some(tag) => match &*self.shorten_tag(tag) {
                Self::NULL_TAG => Self::NULL_TAG,
                Self::BOOL_TAG => Self::BOOL_TAG,
                Self::INT_TAG => Self::INT_TAG,
                Self::FLOAT_TAG => Self::FLOAT_TAG,
                Self::STR_TAG => Self::STR_TAG,
                Self::BINARY_TAG => Self::BINARY_TAG,
                _ => return None,
            },
        };

        let value: Option<Box<dyn Any>> = match tag {
            Self::NULL_TAG if is_null(text) => Some(Box::new(())),
            Self::BOOL_TAG => Some(Box::new(parse_bool(text)?)),
            Self::INT_TAG => Some(Box::new(parse_int(text)?)),
            Self::FLOAT_TAG => Some(Box::new(parse_float(text)?)),
            Self::STR_TAG => Some(Box::new(String::from(text))),
            Self::BINARY_TAG => Some(Box::new(binary::decode(text)?)),
            _ => return None,
        };

        Some(ParsedScalar {
            tag,
            value: value.filter(|_| parse_value),
        })
    }
}

// -----------------------------------------------------------------------------
// Implicit forms

fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok().filter(|_| !hex.starts_with(['+', '-']));
    }
    if let Some(octal) = text.strip_prefix("0o") {
        return i64::from_str_radix(octal, 8).ok().filter(|_| !octal.starts_with(['+', '-']));
    }

    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_float(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let negative = text.starts_with('-');

    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if matches!(text, ".nan" | ".NaN" | ".NAN") {
        return Some(f64::NAN);
    }

    // [0-9]* ( . [0-9]* )? ( [eE] [-+]? [0-9]+ )?, with at least one digit
    // before the exponent.
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }
    text.parse().ok()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScalarStyle;

    fn implicit_tag(text: &str) -> &'static str {
        CoreSchema
            .try_parse(&ScalarEvent::plain(text), false)
            .unwrap()
            .tag
    }

    #[test]
    fn implicit_resolution_order() {
        assert_eq!(implicit_tag(""), CoreSchema::NULL_TAG);
        assert_eq!(implicit_tag("~"), CoreSchema::NULL_TAG);
        assert_eq!(implicit_tag("True"), CoreSchema::BOOL_TAG);
        assert_eq!(implicit_tag("-12"), CoreSchema::INT_TAG);
        assert_eq!(implicit_tag("0o17"), CoreSchema::INT_TAG);
        assert_eq!(implicit_tag("1.5e3"), CoreSchema::FLOAT_TAG);
        assert_eq!(implicit_tag(".5"), CoreSchema::FLOAT_TAG);
        assert_eq!(implicit_tag("-.inf"), CoreSchema::FLOAT_TAG);
        assert_eq!(implicit_tag(".nan"), CoreSchema::FLOAT_TAG);
        assert_eq!(implicit_tag("inf"), CoreSchema::STR_TAG);
        assert_eq!(implicit_tag("1.2.3"), CoreSchema::STR_TAG);
        assert_eq!(implicit_tag("."), CoreSchema::STR_TAG);
        assert_eq!(implicit_tag("yes"), CoreSchema::STR_TAG);
    }

    #[test]
    fn quoted_scalars_are_strings() {
        let scalar = ScalarEvent::new("12", ScalarStyle::DoubleQuoted);
        let parsed = CoreSchema.try_parse(&scalar, true).unwrap();
        assert_eq!(parsed.tag, CoreSchema::STR_TAG);
        assert_eq!(
            parsed.value.unwrap().downcast_ref::<String>().map(String::as_str),
            Some("12")
        );
    }

    #[test]
    fn explicit_schema_tags() {
        let scalar = ScalarEvent::new("12", ScalarStyle::DoubleQuoted).with_tag("!!int");
        let parsed = CoreSchema.try_parse(&scalar, true).unwrap();
        assert_eq!(parsed.value.unwrap().downcast_ref::<i64>(), Some(&12));

        let scalar = ScalarEvent::plain("abc").with_tag("tag:yaml.org,2002:int");
        assert!(CoreSchema.try_parse(&scalar, true).is_none());

        let scalar = ScalarEvent::plain("AQID").with_tag("!!binary");
        let parsed = CoreSchema.try_parse(&scalar, true).unwrap();
        assert_eq!(
            parsed.value.unwrap().downcast_ref::<Vec<u8>>(),
            Some(&alloc::vec![1, 2, 3])
        );

        let scalar = ScalarEvent::plain("1").with_tag("!Custom");
        assert!(CoreSchema.try_parse(&scalar, false).is_none());
    }

    #[test]
    fn default_tags() {
        assert_eq!(CoreSchema.default_tag(TypeId::of::<u16>()), Some(CoreSchema::INT_TAG));
        assert_eq!(CoreSchema.default_tag(TypeId::of::<char>()), Some(CoreSchema::STR_TAG));
        assert_eq!(CoreSchema.default_tag(TypeId::of::<Vec<u8>>()), None);
        assert_eq!(
            CoreSchema.type_for_default_tag("!!float").map(TypeInfo::type_path),
            Some("f64")
        );
        assert_eq!(CoreSchema.expand_tag("!!str"), "tag:yaml.org,2002:str");
    }
}
