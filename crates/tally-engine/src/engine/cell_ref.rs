//! Cell address codec.
//!
//! Converts between zero-based (row, column) coordinates and the A1-style
//! codes users type into formulas ("A1", "B2", "AA100"). Columns use a
//! bijective base-26 alphabet with no zero digit, so "Z" is followed by "AA".
//!
//! # Examples
//!
//! ```
//! use tally_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 1);
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::AddressError;

/// A reference to a cell by row and column indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Decode an A1-style code. Letters are case-insensitive.
    pub fn decode(code: &str) -> Result<CellRef, AddressError> {
        let invalid = |reason| AddressError::InvalidFormat {
            code: code.to_string(),
            reason,
        };

        if code.is_empty() {
            return Err(invalid("empty code"));
        }
        let caps = a1_re()
            .captures(code)
            .ok_or_else(|| invalid("expected letters followed by digits"))?;

        // Bijective base 26: 'A' is 1 and there is no zero digit.
        let column_number = caps["letters"]
            .bytes()
            .try_fold(0usize, |acc, b| {
                let digit = usize::from(b.to_ascii_uppercase() - b'A') + 1;
                acc.checked_mul(26)?.checked_add(digit)
            })
            .ok_or_else(|| invalid("column out of range"))?;

        let row = caps["numbers"]
            .parse::<usize>()
            .map_err(|_| invalid("row out of range"))?
            .checked_sub(1)
            .ok_or_else(|| invalid("row must be at least 1"))?;

        // At least one letter, so the column number is at least 1.
        Ok(CellRef::new(row, column_number - 1))
    }

    /// Encode as an A1-style code.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Column letters for a zero-based index: 0 is "A", 25 is "Z", 26 is "AA".
    pub fn col_to_letters(col: usize) -> String {
        let mut letters = Vec::new();
        let mut rest = Some(col);
        while let Some(n) = rest {
            letters.push(b'A' + (n % 26) as u8);
            rest = (n / 26).checked_sub(1);
        }
        letters.iter().rev().map(|&b| char::from(b)).collect()
    }
}

impl std::str::FromStr for CellRef {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::decode(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}
