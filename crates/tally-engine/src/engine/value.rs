//! Evaluated primitive values.

use std::fmt;

/// Typed runtime errors. An error is an ordinary value: it is cached in the
/// cell that produced it and shown in place of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong number of arguments.
    Arg,
    /// Operand of the wrong primitive kind.
    Value,
    /// Division by zero.
    Div0,
    /// Unknown function or operator name.
    Name,
    /// Circular reference.
    Recur,
}

impl ErrorKind {
    pub fn as_code(self) -> &'static str {
        match self {
            ErrorKind::Arg => "#ARG!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Div0 => "#DIV/0!",
            ErrorKind::Name => "#NAME!",
            ErrorKind::Recur => "#RECUR!",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// The result of evaluating an expression. The set of kinds is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Boolean(bool),
    Error(ErrorKind),
}

impl Value {
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Format for a grid cell `width` characters wide.
    pub fn display(&self, width: usize) -> String {
        super::format::format_value(self, width)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

/// Unpadded text form: decimal, raw text, `TRUE`/`FALSE` or the error token.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Error(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_form() {
        assert_eq!(Value::Integer(-12).to_string(), "-12");
        assert_eq!(Value::Boolean(false).to_string(), "FALSE");
        assert_eq!(Value::Error(ErrorKind::Div0).to_string(), "#DIV/0!");
        assert_eq!(Value::default().to_string(), "");
    }
}
