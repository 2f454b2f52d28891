//! Parsed expression tree.

use std::fmt;

use super::CellRef;

/// One node of a parsed formula. Children are owned by their parent and a
/// whole tree is owned by the cell that parsed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Integer(i64),
    Text(String),
    Boolean(bool),
    Reference(CellRef),
    /// Operators are calls too: `1+2` parses as `Call("+", [1, 2])`.
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Nesting depth of the tree; a leaf counts as 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Call { args, .. } => 1 + args.iter().map(Expr::depth).max().unwrap_or(0),
            Expr::Integer(_) | Expr::Text(_) | Expr::Boolean(_) | Expr::Reference(_) => 1,
        }
    }

    /// Every cell this expression reads directly.
    pub fn references(&self) -> Vec<CellRef> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<CellRef>) {
        match self {
            Expr::Reference(cell) => refs.push(*cell),
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_references(refs);
                }
            }
            Expr::Integer(_) | Expr::Text(_) | Expr::Boolean(_) => {}
        }
    }
}

/// Debug rendering of the tree in prefix form, e.g. `+(1, *(A1, 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{n}"),
            Expr::Text(s) => write!(f, "\"{s}\""),
            Expr::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Expr::Reference(cell) => write!(f, "{cell}"),
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
