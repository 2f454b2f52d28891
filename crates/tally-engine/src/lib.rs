//! tally_engine - Spreadsheet formula engine: parser, evaluator and cell grid.

pub mod builtins;
pub mod engine;
pub mod error;

pub use engine::{CellRef, ErrorKind, Expr, Sheet, Value};
pub use error::{AddressError, EngineError, ParseError, Result};
