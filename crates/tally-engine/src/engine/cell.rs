//! Cell data structures for the spreadsheet grid.
//!
//! - [`CalcState`] - Per-sweep calculation marker (memoization + cycle detection)
//! - [`Cell`] - Raw input text plus the parse tree and value derived from it
//! - [`parse_input`] - Classify raw input as a number, text, or formula

use super::{Expr, Value, parse};
use crate::error::ParseError;

/// Where a cell is in the current recalculation sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalcState {
    /// Not visited yet in this sweep.
    #[default]
    Pending,
    /// On the active evaluation stack. Reaching it again means a cycle.
    InProgress,
    /// Value cached and valid until the next sweep.
    Finished,
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) raw: String,
    /// Derived from `raw` on first calculation, dropped when `raw` changes.
    pub(crate) tree: Option<Result<Expr, ParseError>>,
    pub(crate) value: Value,
    pub(crate) dirty: bool,
    pub(crate) state: CalcState,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            raw: String::new(),
            tree: None,
            value: Value::default(),
            dirty: true,
            state: CalcState::Pending,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn state(&self) -> CalcState {
        self.state
    }

    pub(crate) fn set_raw(&mut self, raw: String) {
        self.raw = raw;
        self.tree = None;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new_empty()
    }
}

/// Classify raw cell input.
/// - Parses entirely as an integer (leading whitespace allowed) -> integer literal,
///   even with a leading `=`
/// - Does not start with `=` -> text literal of the whole input
/// - Otherwise -> formula body after the `=`
pub fn parse_input(raw: &str) -> Result<Expr, ParseError> {
    if let Ok(n) = raw.trim_start().parse::<i64>() {
        return Ok(Expr::Integer(n));
    }
    match raw.strip_prefix('=') {
        Some(body) => parse(body),
        None => Ok(Expr::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_numbers() {
        assert_eq!(parse_input("42"), Ok(Expr::Integer(42)));
        assert_eq!(parse_input("  -3"), Ok(Expr::Integer(-3)));
    }

    #[test]
    fn test_parse_input_text() {
        assert_eq!(parse_input(""), Ok(Expr::Text(String::new())));
        assert_eq!(parse_input("hello"), Ok(Expr::Text("hello".into())));
        assert_eq!(parse_input("42 "), Ok(Expr::Text("42 ".into())));
        assert_eq!(parse_input(" =1+1"), Ok(Expr::Text(" =1+1".into())));
    }

    #[test]
    fn test_parse_input_formula() {
        assert_eq!(parse_input("=1+1").unwrap().to_string(), "+(1, 1)");
        assert_eq!(parse_input("=7"), Ok(Expr::Integer(7)));
        assert!(parse_input("=1+").is_err());
    }

    #[test]
    fn test_set_raw_drops_tree() {
        let mut cell = Cell::new_empty();
        cell.tree = Some(parse_input("=1"));
        cell.set_raw("=2".to_string());
        assert!(cell.tree.is_none());
        assert_eq!(cell.raw(), "=2");
    }
}
