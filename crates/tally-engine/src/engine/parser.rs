//! Formula parser.
//!
//! The parser works directly on trimmed substrings of the formula body; there
//! is no token stream. Each substring is matched against the productions in a
//! fixed order and the first one that fits wins:
//!
//! 1. boolean literal (`TRUE` / `FALSE`, any case)
//! 2. text literal (`"..."` with no other quote inside)
//! 3. integer literal (the whole substring must parse)
//! 4. cell reference (`A1`)
//! 5. bracketed group (`( ... )`)
//! 6. function call (`NAME(arg, ...)`)
//! 7. operator expression, split at the rightmost operator of lowest
//!    precedence so chains of equal precedence group to the left
//!
//! Brackets and function calls fall through to the later productions when
//! their inner text does not parse, because the same text may still be a
//! valid operator expression (`(1)+(2)`, `F(1)+G(2)`).

use regex::Regex;
use std::sync::OnceLock;

use super::{CellRef, Expr};
use crate::error::ParseError;

/// Nesting limit for bracket, call and operator productions.
pub const MAX_PARSE_DEPTH: usize = 256;

/// Parse a formula body (the text after the leading `=`).
pub fn parse(body: &str) -> Result<Expr, ParseError> {
    parse_at(body, 0)
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<name>[A-Za-z_][A-Za-z0-9_]*)\(").expect("call regex must compile")
    })
}

fn precedence(op: &str) -> Option<u8> {
    match op {
        "*" | "/" => Some(3),
        "+" | "-" => Some(2),
        "&" => Some(1),
        "=" | "<>" | "<" | "<=" | ">" | ">=" => Some(0),
        _ => None,
    }
}

fn is_operator_byte(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'*' | b'/' | b'&' | b'=' | b'<' | b'>')
}

fn parse_at(text: &str, depth: usize) -> Result<Expr, ParseError> {
    if depth > MAX_PARSE_DEPTH {
        return Err(ParseError::TooDeep {
            attempt: text.to_string(),
        });
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyExpression {
            attempt: text.to_string(),
        });
    }

    if trimmed.eq_ignore_ascii_case("TRUE") {
        return Ok(Expr::Boolean(true));
    }
    if trimmed.eq_ignore_ascii_case("FALSE") {
        return Ok(Expr::Boolean(false));
    }

    if trimmed.len() >= 2
        && trimmed.starts_with('"')
        && trimmed.ends_with('"')
        && trimmed.bytes().filter(|&b| b == b'"').count() == 2
    {
        return Ok(Expr::Text(trimmed[1..trimmed.len() - 1].to_string()));
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Expr::Integer(n));
    }

    if let Ok(cell) = CellRef::decode(trimmed) {
        return Ok(Expr::Reference(cell));
    }

    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        match parse_at(&trimmed[1..trimmed.len() - 1], depth + 1) {
            Ok(expr) => return Ok(expr),
            Err(e @ ParseError::TooDeep { .. }) => return Err(e),
            Err(_) => {}
        }
    }

    if let Some(expr) = parse_call(trimmed, depth)? {
        return Ok(expr);
    }

    parse_operator(trimmed, depth)
}

/// Split the inside of a call's brackets at top-level commas.
/// Returns `None` when the brackets do not balance.
fn split_args(inner: &str) -> Option<Vec<&str>> {
    let mut args = Vec::new();
    let mut level = 0usize;
    let mut in_text = false;
    let mut start = 0;

    for (i, b) in inner.bytes().enumerate() {
        if b == b'"' {
            in_text = !in_text;
        }
        if in_text {
            continue;
        }
        match b {
            b'(' => level += 1,
            b')' => level = level.checked_sub(1)?,
            b',' if level == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if level != 0 {
        return None;
    }
    let last = &inner[start..];
    if !last.trim().is_empty() {
        args.push(last);
    }
    Some(args)
}

/// `Ok(None)` means "not a function call", and the caller moves on.
fn parse_call(trimmed: &str, depth: usize) -> Result<Option<Expr>, ParseError> {
    if !trimmed.ends_with(')') {
        return Ok(None);
    }
    let Some(caps) = call_re().captures(trimmed) else {
        return Ok(None);
    };
    let name = &caps["name"];
    let inner = &trimmed[name.len() + 1..trimmed.len() - 1];
    let Some(raw_args) = split_args(inner) else {
        return Ok(None);
    };

    let mut args = Vec::with_capacity(raw_args.len());
    for raw in raw_args {
        match parse_at(raw, depth + 1) {
            Ok(arg) => args.push(arg),
            Err(e @ ParseError::TooDeep { .. }) => return Err(e),
            Err(_) => return Ok(None),
        }
    }
    Ok(Some(Expr::call(name, args)))
}

fn parse_operator(trimmed: &str, depth: usize) -> Result<Expr, ParseError> {
    let bytes = trimmed.as_bytes();
    let mut level = 0usize;
    let mut in_text = false;
    // (start, end, precedence) of the split candidate
    let mut best: Option<(usize, usize, u8)> = None;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            in_text = !in_text;
        }
        if in_text {
            i += 1;
            continue;
        }

        if level == 0 {
            let two = trimmed.get(i..i + 2).and_then(|op| precedence(op).map(|p| (op, p)));
            let one = trimmed.get(i..i + 1).and_then(|op| precedence(op).map(|p| (op, p)));
            if let Some((op, p)) = two.or(one) {
                // A sign directly after another operator (`2*-3`) belongs to
                // the right operand, it is not a split point.
                let signed_operand = matches!(op, "+" | "-")
                    && trimmed[..i]
                        .trim_end()
                        .bytes()
                        .last()
                        .is_some_and(is_operator_byte);
                if !signed_operand && best.is_none_or(|(_, _, min)| p <= min) {
                    best = Some((i, i + op.len(), p));
                }
                i += op.len();
                continue;
            }
        }

        match b {
            b'(' => level += 1,
            b')' => {
                level = level.checked_sub(1).ok_or_else(|| ParseError::UnmatchedBracket {
                    attempt: trimmed.to_string(),
                })?;
            }
            _ => {}
        }
        i += 1;
    }

    let Some((start, end, _)) = best else {
        return Err(ParseError::NoMatch {
            attempt: trimmed.to_string(),
        });
    };

    let op = &trimmed[start..end];
    let left = &trimmed[..start];
    let right = &trimmed[end..];

    let args = if matches!(op, "+" | "-") && left.trim().is_empty() {
        vec![parse_at(right, depth + 1)?]
    } else {
        vec![parse_at(left, depth + 1)?, parse_at(right, depth + 1)?]
    };
    Ok(Expr::call(op, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Expr {
        Expr::Integer(n)
    }

    fn cell(code: &str) -> Expr {
        Expr::Reference(CellRef::decode(code).unwrap())
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("42").unwrap(), int(42));
        assert_eq!(parse("  -7 ").unwrap(), int(-7));
        assert_eq!(parse("+3").unwrap(), int(3));
        assert_eq!(parse("true").unwrap(), Expr::Boolean(true));
        assert_eq!(parse(" FaLsE ").unwrap(), Expr::Boolean(false));
        assert_eq!(parse("\"hello world\"").unwrap(), Expr::Text("hello world".into()));
        assert_eq!(parse("\"\"").unwrap(), Expr::Text(String::new()));
        assert_eq!(parse("b12").unwrap(), cell("B12"));
    }

    #[test]
    fn test_text_literal_is_not_split() {
        assert_eq!(parse("\"a+b\"").unwrap(), Expr::Text("a+b".into()));
        assert_eq!(parse("\"1,2\"").unwrap(), Expr::Text("1,2".into()));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("1+2*3").unwrap(),
            Expr::call("+", vec![int(1), Expr::call("*", vec![int(2), int(3)])])
        );
        assert_eq!(
            parse("(1+2)*3").unwrap(),
            Expr::call("*", vec![Expr::call("+", vec![int(1), int(2)]), int(3)])
        );
        assert_eq!(
            parse("1 & 2 = 3").unwrap().to_string(),
            "=(&(1, 2), 3)"
        );
    }

    #[test]
    fn test_left_associative_chains() {
        assert_eq!(parse("10-3-2").unwrap().to_string(), "-(-(10, 3), 2)");
        assert_eq!(parse("8/4/2").unwrap().to_string(), "/(/(8, 4), 2)");
        assert_eq!(parse("1-2+3").unwrap().to_string(), "+(-(1, 2), 3)");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(parse("-A1").unwrap(), Expr::call("-", vec![cell("A1")]));
        assert_eq!(parse("- 5").unwrap(), Expr::call("-", vec![int(5)]));
        assert_eq!(parse("3-2").unwrap(), Expr::call("-", vec![int(3), int(2)]));
        assert_eq!(parse("2*-3").unwrap(), Expr::call("*", vec![int(2), int(-3)]));
        assert_eq!(parse("1--A1").unwrap().to_string(), "-(1, -(A1))");
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(parse("1<=2").unwrap(), Expr::call("<=", vec![int(1), int(2)]));
        assert_eq!(parse("1<>2").unwrap(), Expr::call("<>", vec![int(1), int(2)]));
        assert_eq!(parse("A1>=B1").unwrap(), Expr::call(">=", vec![cell("A1"), cell("B1")]));
        assert_eq!(parse("1<-2").unwrap(), Expr::call("<", vec![int(1), int(-2)]));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse("SUM(1,SUM(2,3))").unwrap(),
            Expr::call(
                "SUM",
                vec![int(1), Expr::call("SUM", vec![int(2), int(3)])]
            )
        );
        assert_eq!(parse("NOW()").unwrap(), Expr::call("NOW", vec![]));
        assert_eq!(parse("f(  )").unwrap(), Expr::call("f", vec![]));
        assert_eq!(parse("F(1,)").unwrap(), Expr::call("F", vec![int(1)]));
        assert_eq!(
            parse("IF(A1=\"a,(b\", 1, 2)").unwrap().to_string(),
            "IF(=(A1, \"a,(b\"), 1, 2)"
        );
        assert_eq!(parse("_x1(2)").unwrap(), Expr::call("_x1", vec![int(2)]));
    }

    #[test]
    fn test_calls_and_brackets_fall_through_to_operators() {
        assert_eq!(
            parse("SUM(1)+SUM(2)").unwrap().to_string(),
            "+(SUM(1), SUM(2))"
        );
        assert_eq!(parse("(1)+(2)").unwrap().to_string(), "+(1, 2)");
        assert_eq!(parse("((1+2))*(3)").unwrap().to_string(), "*(+(1, 2), 3)");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("   "), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(parse("@"), Err(ParseError::NoMatch { .. })));
        assert!(matches!(parse("1+"), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(parse("1)+(2"), Err(ParseError::UnmatchedBracket { .. })));
        assert!(parse("(1+2").is_err());
        assert!(parse("SUM(1,,2)").is_err());
        assert!(parse("\"a\"\"").is_err());
    }

    #[test]
    fn test_error_reports_attempt() {
        let err = parse("1 + foo bar").unwrap_err();
        assert_eq!(err.attempt(), "foo bar");
        assert!(err.to_string().contains("foo bar"));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(400), ")".repeat(400));
        assert!(matches!(parse(&deep), Err(ParseError::TooDeep { .. })));

        let fine = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse(&fine).unwrap(), int(1));
    }
}
