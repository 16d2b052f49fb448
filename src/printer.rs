use std::fmt;

use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{}", n),
            Value::Err(msg) => write!(f, "Error: {}", msg),
            Value::Sym(name) => f.write_str(name),
            Value::Str(s) => write_escaped(f, s),
            Value::Sexpr(items) => write_seq(f, items, '(', ')'),
            Value::Qexpr(items) => write_seq(f, items, '{', '}'),
            Value::Builtin(_) => f.write_str("<builtin>"),
            Value::Lambda(l) => {
                write!(f, "(\\ {{{}}} ", l.params.join(" "))?;
                write_seq(f, &l.body, '{', '}')?;
                f.write_str(")")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

/// Strings print escaped so the output re-parses to the same value.
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Render a value to stdout with a trailing newline.
pub fn println(v: &Value) {
    println!("{}", v);
}
