//! One-shot formula evaluation for `tally -c`.

use tally_engine::engine::{Evaluator, FunctionRegistry, Sheet, Value, format_value, parse};
use tally_engine::ParseError;

/// What `-c` should print and how the process should exit.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Text for stdout; the formula produced a non-error value or a tree.
    Printed(String),
    /// Text for stdout; the value is an error token.
    ErrorValue(String),
    /// The formula did not parse.
    Invalid(ParseError),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Printed(_) => 0,
            Outcome::ErrorValue(_) | Outcome::Invalid(_) => 1,
        }
    }
}

/// Evaluate `formula` against `sheet` (normally empty).
/// A leading `=` is accepted and ignored.
pub fn run_formula(sheet: &mut Sheet, formula: &str, tree: bool, width: Option<usize>) -> Outcome {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    let expr = match parse(body) {
        Ok(expr) => expr,
        Err(err) => return Outcome::Invalid(err),
    };

    if tree {
        return Outcome::Printed(expr.to_string());
    }

    let registry = FunctionRegistry::with_builtins();
    let value = Evaluator::new(&registry, sheet).evaluate(&expr);
    let text = match width {
        Some(width) => format_value(&value, width),
        None => value.to_string(),
    };
    match value {
        Value::Error(_) => Outcome::ErrorValue(text),
        _ => Outcome::Printed(text),
    }
}
