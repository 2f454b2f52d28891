//! Spreadsheet engine API.
//!
//! This module provides the formula engine for the spreadsheet:
//!
//! - [`CellRef`] - Cell address codec (A1 notation ↔ row/col indices)
//! - [`Value`], [`ErrorKind`] - Evaluated primitive values and typed errors
//! - [`format_value`] - Fixed-width display formatting
//! - [`Expr`], [`parse`] - Formula parser and expression tree
//! - [`Evaluator`], [`Resolver`] - Tree evaluation against a source of cell values
//! - [`Sheet`], [`Cell`], [`CalcState`] - The cell grid and recalculation sweep

mod cell;
mod cell_ref;
mod eval;
mod expr;
mod format;
mod parser;
mod sheet;
mod value;

pub use cell::{CalcState, Cell, parse_input};
pub use cell_ref::CellRef;
pub use eval::{EmptyResolver, Evaluator, Resolver, evaluate_standalone};
pub use expr::Expr;
pub use format::{format_centered, format_integer, format_text, format_value};
pub use parser::{MAX_PARSE_DEPTH, parse};
pub use sheet::{DEFAULT_COLS, DEFAULT_ROWS, MAX_CELLS, MAX_EVAL_DEPTH, Recalculation, Sheet};
pub use value::{ErrorKind, Value};

pub use crate::builtins::FunctionRegistry;
