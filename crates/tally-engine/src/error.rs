//! Error types for the Tally engine.

use thiserror::Error;

use crate::engine::CellRef;

/// A cell address that does not follow the `[A-Za-z]+[0-9]+` form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid cell address `{code}`: {reason}")]
    InvalidFormat { code: String, reason: &'static str },
}

/// A formula body that does not match the grammar.
///
/// Every variant carries the (sub)string the parser was looking at when it
/// gave up, so the editor can point at the offending part.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("cannot parse `{attempt}`: empty expression")]
    EmptyExpression { attempt: String },

    #[error("cannot parse `{attempt}`: unmatched bracket")]
    UnmatchedBracket { attempt: String },

    #[error("cannot parse `{attempt}`: does not match any expression type")]
    NoMatch { attempt: String },

    #[error("cannot parse `{attempt}`: expression is nested too deeply")]
    TooDeep { attempt: String },
}

impl ParseError {
    /// The text the parser was attempting when it failed.
    pub fn attempt(&self) -> &str {
        match self {
            ParseError::EmptyExpression { attempt }
            | ParseError::UnmatchedBracket { attempt }
            | ParseError::NoMatch { attempt }
            | ParseError::TooDeep { attempt } => attempt,
        }
    }
}

/// Errors returned by the sheet's collaborator interface.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cell {0} is outside the sheet")]
    OutOfBounds(CellRef),

    #[error("a sheet of {rows} x {cols} cells is too large")]
    TooLarge { rows: usize, cols: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
