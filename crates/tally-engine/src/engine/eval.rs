//! Expression evaluation.
//!
//! Evaluation failures are values: a builtin that cannot produce a result
//! returns `Err(ErrorKind)` internally, and [`Evaluator::evaluate`] folds it
//! into [`Value::Error`]. Operands that already evaluated to an error are
//! surfaced through [`Evaluator::operand`] so builtins propagate them with
//! `?`.

use super::{CellRef, ErrorKind, Expr, Value};
use crate::builtins::FunctionRegistry;

/// Supplies the current value of a referenced cell.
pub trait Resolver {
    fn resolve(&mut self, cell: CellRef) -> Value;
}

/// Resolver for formulas evaluated without a sheet: every cell is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyResolver;

impl Resolver for EmptyResolver {
    fn resolve(&mut self, _cell: CellRef) -> Value {
        Value::default()
    }
}

pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    resolver: &'a mut dyn Resolver,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, resolver: &'a mut dyn Resolver) -> Self {
        Evaluator { registry, resolver }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Integer(n) => Value::Integer(*n),
            Expr::Text(s) => Value::Text(s.clone()),
            Expr::Boolean(b) => Value::Boolean(*b),
            Expr::Reference(cell) => self.resolver.resolve(*cell),
            Expr::Call { name, args } => match self.registry.lookup(name) {
                Some(builtin) => builtin(args, self).unwrap_or_else(Value::Error),
                None => Value::Error(ErrorKind::Name),
            },
        }
    }

    /// Evaluate an argument, turning an error value into `Err`.
    pub fn operand(&mut self, expr: &Expr) -> Result<Value, ErrorKind> {
        match self.evaluate(expr) {
            Value::Error(kind) => Err(kind),
            value => Ok(value),
        }
    }

    pub fn integer(&mut self, expr: &Expr) -> Result<i64, ErrorKind> {
        match self.operand(expr)? {
            Value::Integer(n) => Ok(n),
            _ => Err(ErrorKind::Value),
        }
    }

    pub fn text(&mut self, expr: &Expr) -> Result<String, ErrorKind> {
        match self.operand(expr)? {
            Value::Text(s) => Ok(s),
            _ => Err(ErrorKind::Value),
        }
    }

    pub fn boolean(&mut self, expr: &Expr) -> Result<bool, ErrorKind> {
        match self.operand(expr)? {
            Value::Boolean(b) => Ok(b),
            _ => Err(ErrorKind::Value),
        }
    }
}

/// Evaluate a standalone expression with the built-in functions and no sheet.
pub fn evaluate_standalone(expr: &Expr) -> Value {
    let registry = FunctionRegistry::with_builtins();
    let mut resolver = EmptyResolver;
    Evaluator::new(&registry, &mut resolver).evaluate(expr)
}
