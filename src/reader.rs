use crate::error::{LixError, LixResult};
use crate::value::Value;

/// The characters a symbol may be spelled from. `\` is here because the
/// lambda builtin is itself a symbol.
const SYMBOL_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+-*/\\=<>!&";

/// Hand-rolled reader: parses lix source text into expression values.
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Read one expression. Returns None at EOF.
    pub fn read(&mut self) -> LixResult<Option<Value>> {
        self.skip_whitespace_and_comments();
        if self.pos >= self.input.len() {
            return Ok(None);
        }
        let val = self.read_expr()?;
        Ok(Some(val))
    }

    /// Read all expressions from the input.
    pub fn read_all(&mut self) -> LixResult<Vec<Value>> {
        let mut results = Vec::new();
        while let Some(val) = self.read()? {
            results.push(val);
        }
        Ok(results)
    }

    /// Return current position in the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        if self.pos < self.input.len() {
            Some(self.input[self.pos])
        } else {
            None
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.input.len() {
                let ch = self.input[self.pos];
                if ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            // Line comments run from ';' to end of line.
            if self.pos < self.input.len() && self.input[self.pos] == b';' {
                while self.pos < self.input.len() && self.input[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn read_expr(&mut self) -> LixResult<Value> {
        self.skip_whitespace_and_comments();

        let ch = self
            .peek()
            .ok_or_else(|| LixError::Read("unexpected end of input".into()))?;

        match ch {
            b'(' => self.read_seq(b')'),
            b'{' => self.read_seq(b'}'),
            b')' => Err(LixError::Read("unexpected ')'".into())),
            b'}' => Err(LixError::Read("unexpected '}'".into())),
            b'"' => self.read_string(),
            c if SYMBOL_CHARS.contains(&c) => self.read_word(),
            c => Err(LixError::Read(format!(
                "unexpected character '{}'",
                c as char
            ))),
        }
    }

    /// Read an S-Expression `( … )` or a Q-Expression `{ … }`.
    fn read_seq(&mut self, close: u8) -> LixResult<Value> {
        self.pos += 1; // consume the opener
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => {
                    return Err(LixError::Read(format!(
                        "expected '{}' before end of input",
                        close as char
                    )))
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => items.push(self.read_expr()?),
            }
        }
        if close == b')' {
            Ok(Value::Sexpr(items))
        } else {
            Ok(Value::Qexpr(items))
        }
    }

    /// Read a string literal with the usual escapes.
    fn read_string(&mut self) -> LixResult<Value> {
        self.pos += 1; // consume the opening quote
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                None => return Err(LixError::Read("unterminated string".into())),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let esc = self
                        .peek()
                        .ok_or_else(|| LixError::Read("unterminated string".into()))?;
                    self.pos += 1;
                    bytes.push(match esc {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'\\' => b'\\',
                        b'"' => b'"',
                        b'\'' => b'\'',
                        other => {
                            return Err(LixError::Read(format!(
                                "unknown escape '\\{}'",
                                other as char
                            )))
                        }
                    });
                }
                Some(c) => {
                    self.pos += 1;
                    bytes.push(c);
                }
            }
        }
        let s = String::from_utf8(bytes)
            .map_err(|_| LixError::Read("invalid utf-8 in string".into()))?;
        Ok(Value::Str(s))
    }

    /// Read a number or a symbol. A word that starts like a number must
    /// parse as one.
    fn read_word(&mut self) -> LixResult<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if SYMBOL_CHARS.contains(&c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let token = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| LixError::Read("invalid utf-8 in symbol".into()))?;
        let bytes = token.as_bytes();
        let looks_numeric = bytes[0].is_ascii_digit()
            || (bytes[0] == b'-' && bytes.len() > 1 && bytes[1].is_ascii_digit());
        if looks_numeric {
            token
                .parse::<i64>()
                .map(Value::Num)
                .map_err(|_| LixError::Read(format!("invalid number '{}'", token)))
        } else {
            Ok(Value::sym(token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_one(src: &str) -> Value {
        Reader::new(src)
            .read()
            .expect("source parses")
            .expect("source is non-empty")
    }

    #[test]
    fn reads_numbers_and_symbols() {
        assert_eq!(parse_one("42"), Value::Num(42));
        assert_eq!(parse_one("-7"), Value::Num(-7));
        assert_eq!(parse_one("foo"), Value::sym("foo"));
        assert_eq!(parse_one("-"), Value::sym("-"));
        assert_eq!(parse_one("<="), Value::sym("<="));
        assert_eq!(parse_one("\\"), Value::sym("\\"));
    }

    #[test]
    fn reads_nested_expressions() {
        assert_eq!(
            parse_one("(+ 1 (* 2 3))"),
            Value::Sexpr(vec![
                Value::sym("+"),
                Value::Num(1),
                Value::Sexpr(vec![Value::sym("*"), Value::Num(2), Value::Num(3)]),
            ])
        );
    }

    #[test]
    fn reads_qexprs() {
        assert_eq!(
            parse_one("{1 \"two\" three}"),
            Value::Qexpr(vec![
                Value::Num(1),
                Value::string("two"),
                Value::sym("three"),
            ])
        );
    }

    #[test]
    fn reads_string_escapes() {
        assert_eq!(parse_one(r#""a\nb\t\"c\\""#), Value::string("a\nb\t\"c\\"));
    }

    #[test]
    fn skips_comments() {
        let forms = Reader::new("; leading comment\n1 ; trailing\n2")
            .read_all()
            .expect("parses");
        assert_eq!(forms, vec![Value::Num(1), Value::Num(2)]);
    }

    #[test]
    fn empty_input_reads_nothing() {
        assert_eq!(Reader::new("  ; just a comment").read().expect("ok"), None);
    }

    #[test]
    fn unbalanced_close_is_an_error() {
        assert!(Reader::new(")").read().is_err());
        assert!(Reader::new("}").read().is_err());
    }

    #[test]
    fn unterminated_forms_are_errors() {
        assert!(Reader::new("(+ 1 2").read().is_err());
        assert!(Reader::new("\"abc").read().is_err());
    }

    #[test]
    fn unknown_escape_is_an_error() {
        assert!(Reader::new(r#""\q""#).read().is_err());
    }

    #[test]
    fn malformed_number_is_an_error() {
        assert!(Reader::new("12ab").read().is_err());
        assert!(Reader::new("999999999999999999999999999").read().is_err());
    }
}
