use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

#[inline]
fn is_tag_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_.~!$&'()*+,;=:@/?#[]".contains(c)
}

/// Percent-encodes the characters a tag cannot hold as UTF-8 `%XX`.
///
/// ```
/// use vc_serial::registry::{escape_tag, unescape_tag};
///
/// assert_eq!(escape_tag("!demo::Pair[i32,String]"), "!demo::Pair[i32,String]");
/// assert_eq!(escape_tag("!Café Menu"), "!Caf%C3%A9%20Menu");
/// assert_eq!(unescape_tag("!Caf%C3%A9%20Menu"), "!Café Menu");
/// ```
pub fn escape_tag(tag: &str) -> Cow<'_, str> {
    if tag.chars().all(is_tag_safe) {
        return Cow::Borrowed(tag);
    }

    let mut out = String::with_capacity(tag.len() + 8);
    for c in tag.chars() {
        if is_tag_safe(c) {
            out.push(c);
        } else {
            let mut buf = [0_u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    Cow::Owned(out)
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%XX` escapes. Malformed escapes are kept verbatim.
pub fn unescape_tag(tag: &str) -> Cow<'_, str> {
    if !tag.contains('%') {
        return Cow::Borrowed(tag);
    }

    let bytes = tag.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%'
            && index + 2 < bytes.len()
            && let (Some(high), Some(low)) = (hex_value(bytes[index + 1]), hex_value(bytes[index + 2]))
        {
            out.push((high << 4) | low);
            index += 3;
        } else {
            out.push(bytes[index]);
            index += 1;
        }
    }

    match String::from_utf8(out) {
        Ok(text) => Cow::Owned(text),
        Err(_) => Cow::Borrowed(tag),
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_tag, unescape_tag};

    #[test]
    fn lenient_decoding() {
        assert_eq!(unescape_tag("!a%2"), "!a%2");
        assert_eq!(unescape_tag("!a%zz"), "!a%zz");
        assert_eq!(unescape_tag("!100%"), "!100%");
        // Not UTF-8 once decoded.
        assert_eq!(unescape_tag("!%FF"), "!%FF");
    }

    #[test]
    fn escape_round_trip() {
        let tag = "!ns::Name<with spaces>";
        assert_eq!(unescape_tag(&escape_tag(tag)), tag);
        assert_eq!(escape_tag("!!int"), "!!int");
    }
}
