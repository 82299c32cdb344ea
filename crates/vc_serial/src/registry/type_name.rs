use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// TypeName

/// A parsed type name.
///
/// ```text
/// type-name    := name generic-args? array-rank* (',' assembly-hint)?
/// generic-args := '[' type-name (',' type-name)* ']'
/// array-rank   := '[]'
/// ```
///
/// The hint is only allowed at the top level.
///
/// ```
/// use vc_serial::registry::TypeName;
///
/// let name = TypeName::parse("demo::Pair[i32,String[]][], demo").unwrap();
/// assert_eq!(name.name, "demo::Pair");
/// assert_eq!(name.args.len(), 2);
/// assert_eq!(name.args[1].array_rank, 1);
/// assert_eq!(name.array_rank, 1);
/// assert_eq!(name.hint.as_deref(), Some("demo"));
/// assert_eq!(name.to_string(), "demo::Pair[i32,String[]][], demo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub args: Vec<TypeName>,
    pub array_rank: usize,
    pub hint: Option<String>,
}

impl TypeName {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut parser = Parser { text, pos: 0 };
        let mut name = parser.type_name()?;

        parser.skip_spaces();
        if parser.eat(',') {
            let hint = parser.rest().trim();
            if hint.is_empty() {
                return Err(format!("empty assembly hint in `{text}`"));
            }
            name.hint = Some(hint.into());
            parser.pos = text.len();
        }
        if parser.pos != text.len() {
            return Err(format!("unexpected `{}` in `{text}`", parser.rest()));
        }
        Ok(name)
    }

    /// The name without hint, e.g. `demo::Pair[i32,String]`.
    pub fn full_name(&self) -> String {
        let mut out = String::new();
        self.write_name(&mut out);
        out
    }

    fn write_name(&self, out: &mut String) {
        out.push_str(&self.name);
        if !self.args.is_empty() {
            out.push('[');
            for (index, arg) in self.args.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                arg.write_name(out);
            }
            out.push(']');
        }
        for _ in 0..self.array_rank {
            out.push_str("[]");
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())?;
        if let Some(hint) = &self.hint {
            write!(f, ", {hint}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Parser

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_spaces(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn type_name(&mut self) -> Result<TypeName, String> {
        self.skip_spaces();
        let rest = self.rest();
        let len = rest.find(['[', ']', ',']).unwrap_or(rest.len());
        let name = rest[..len].trim();
        if name.is_empty() {
            return Err(format!("missing type name at `{rest}`"));
        }
        self.pos += len;

        let mut args = Vec::new();
        if self.rest().starts_with('[') && !self.rest().starts_with("[]") {
            self.pos += 1;
            loop {
                args.push(self.type_name()?);
                self.skip_spaces();
                if self.eat(']') {
                    break;
                }
                if !self.eat(',') {
                    return Err(format!("expected `,` or `]` at `{}`", self.rest()));
                }
            }
        }

        let mut array_rank = 0;
        while self.rest().starts_with("[]") {
            self.pos += 2;
            array_rank += 1;
        }

        Ok(TypeName {
            name: name.into(),
            args,
            array_rank,
            hint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TypeName;

    #[test]
    fn simple_and_nested() {
        let name = TypeName::parse("i32").unwrap();
        assert_eq!(name.name, "i32");
        assert!(name.args.is_empty());

        let name = TypeName::parse("Outer[Inner[u8],bool][][]").unwrap();
        assert_eq!(name.array_rank, 2);
        assert_eq!(name.args[0].args[0].name, "u8");
        assert_eq!(name.full_name(), "Outer[Inner[u8],bool][][]");
    }

    #[test]
    fn malformed() {
        assert!(TypeName::parse("").is_err());
        assert!(TypeName::parse("Pair[i32").is_err());
        assert!(TypeName::parse("Pair[i32,]").is_err());
        assert!(TypeName::parse("i32]").is_err());
        assert!(TypeName::parse("i32,").is_err());
    }
}
