//! The dependency store: a fixed-size grid of cells and the recalculation sweep.
//!
//! A sweep resets every cell to [`CalcState::Pending`] and then calculates
//! each one in row-major order. References are resolved on demand by
//! recursing into the referenced cell, so the order of the sweep does not
//! matter: a cell already [`Finished`](CalcState::Finished) returns its cached
//! value, and a cell found [`InProgress`](CalcState::InProgress) is part of a
//! cycle and yields `#RECUR!`.
//!
//! Native recursion is bounded by charging every cell calculation the nesting
//! depth of its expression tree against [`MAX_EVAL_DEPTH`]. A cell that would
//! exceed the budget is refused and stays pending, as do the cells waiting on
//! it; later passes of the same sweep pick them up from a shallower stack.

use log::{debug, trace};
use std::sync::Arc;

use super::cell::parse_input;
use super::{CalcState, Cell, CellRef, ErrorKind, Evaluator, Expr, Resolver, Value, parse};
use crate::builtins::FunctionRegistry;
use crate::error::{EngineError, ParseError, Result};

pub const DEFAULT_ROWS: usize = 100;
pub const DEFAULT_COLS: usize = 100;

/// Evaluation budget for one stack of nested cell calculations, in levels of
/// expression nesting summed along the chain of references.
pub const MAX_EVAL_DEPTH: usize = 512;

/// Largest number of cells a sheet may hold.
pub const MAX_CELLS: usize = 1 << 20;

/// Summary of one recalculation sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Recalculation {
    pub cells: usize,
    pub errors: usize,
    pub changed: usize,
}

pub struct Sheet {
    rows: usize,
    cols: usize,
    /// Row-major.
    cells: Vec<Cell>,
    registry: Arc<FunctionRegistry>,
    depth: usize,
    /// Calculations refused for lack of budget, ever.
    cuts: usize,
}

impl Sheet {
    /// An empty sheet. Fails when `rows * cols` exceeds [`MAX_CELLS`].
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::with_registry(rows, cols, FunctionRegistry::with_builtins())
    }

    pub fn with_registry(rows: usize, cols: usize, registry: FunctionRegistry) -> Result<Self> {
        match rows.checked_mul(cols) {
            Some(len) if len <= MAX_CELLS => Ok(Self::allocate(rows, cols, registry)),
            _ => Err(EngineError::TooLarge { rows, cols }),
        }
    }

    fn allocate(rows: usize, cols: usize, registry: FunctionRegistry) -> Self {
        Sheet {
            rows,
            cols,
            cells: vec![Cell::new_empty(); rows * cols],
            registry: Arc::new(registry),
            depth: 0,
            cuts: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    fn index(&self, cell: CellRef) -> Option<usize> {
        self.contains(cell).then(|| cell.row * self.cols + cell.col)
    }

    pub fn cell(&self, cell: CellRef) -> Option<&Cell> {
        self.index(cell).map(|i| &self.cells[i])
    }

    /// Overwrite a cell's raw text. Call [`Sheet::recalculate`] afterwards.
    pub fn set_raw_text(&mut self, cell: CellRef, text: impl Into<String>) -> Result<()> {
        let idx = self.index(cell).ok_or(EngineError::OutOfBounds(cell))?;
        self.cells[idx].set_raw(text.into());
        Ok(())
    }

    pub fn raw_text(&self, cell: CellRef) -> Option<&str> {
        self.cell(cell).map(Cell::raw)
    }

    /// The value cached by the last sweep.
    pub fn value(&self, cell: CellRef) -> Option<&Value> {
        self.cell(cell).map(Cell::value)
    }

    pub fn state(&self, cell: CellRef) -> Option<CalcState> {
        self.cell(cell).map(Cell::state)
    }

    /// Cached value formatted for a column `width` characters wide.
    pub fn display_value(&self, cell: CellRef, width: usize) -> String {
        match self.value(cell) {
            Some(value) => value.display(width),
            None => " ".repeat(width),
        }
    }

    /// Whether the cell's value changed in the most recent sweep.
    pub fn is_dirty(&self, cell: CellRef) -> bool {
        self.cell(cell).is_some_and(|c| c.dirty)
    }

    pub fn clear_dirty(&mut self, cell: CellRef) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx].dirty = false;
        }
    }

    /// Check a formula body (without the leading `=`) before committing it.
    pub fn validate(&self, body: &str) -> std::result::Result<(), ParseError> {
        parse(body).map(|_| ())
    }

    /// Why the cell's input failed to parse, if it did.
    pub fn parse_error(&self, cell: CellRef) -> Option<&ParseError> {
        match self.cell(cell)?.tree.as_ref()? {
            Err(err) => Some(err),
            Ok(_) => None,
        }
    }

    /// Cells read directly by this cell's formula.
    pub fn references(&self, cell: CellRef) -> Vec<CellRef> {
        match self.cell(cell).and_then(|c| c.tree.as_ref()) {
            Some(Ok(expr)) => expr.references(),
            _ => Vec::new(),
        }
    }

    /// Produce the value of one cell within the current sweep.
    pub fn calculate(&mut self, cell: CellRef) -> Value {
        let Some(idx) = self.index(cell) else {
            return Value::default();
        };

        match self.cells[idx].state {
            CalcState::Finished => return self.cells[idx].value.clone(),
            CalcState::InProgress => {
                trace!("circular reference through {cell}");
                return Value::Error(ErrorKind::Recur);
            }
            CalcState::Pending => {}
        }

        let tree = match self.cells[idx].tree.take() {
            Some(tree) => tree,
            None => parse_input(&self.cells[idx].raw),
        };
        let cost = tree.as_ref().map_or(1, Expr::depth);

        if self.depth + cost > MAX_EVAL_DEPTH {
            // Stays pending; a later pass reaches it from a shallower stack.
            trace!("evaluation budget exhausted at {cell}");
            self.cells[idx].tree = Some(tree);
            self.cuts += 1;
            return Value::Error(ErrorKind::Recur);
        }

        self.cells[idx].state = CalcState::InProgress;
        let cuts = self.cuts;
        let value = match &tree {
            Ok(expr) => self.evaluate(expr, cost),
            Err(err) => {
                debug!("{cell} does not parse: {err}");
                Value::Error(ErrorKind::Value)
            }
        };
        self.cells[idx].tree = Some(tree);

        if self.cuts != cuts {
            // Something below was refused, so this value is not final.
            self.cells[idx].state = CalcState::Pending;
            return value;
        }
        self.finish(idx, value.clone());
        value
    }

    fn finish(&mut self, idx: usize, value: Value) {
        let entry = &mut self.cells[idx];
        if entry.value != value {
            entry.dirty = true;
        }
        entry.value = value;
        entry.state = CalcState::Finished;
    }

    fn evaluate(&mut self, expr: &Expr, cost: usize) -> Value {
        let registry = Arc::clone(&self.registry);
        self.depth += cost;
        let value = Evaluator::new(&registry, self).evaluate(expr);
        self.depth -= cost;
        value
    }

    /// Recompute every cell.
    pub fn recalculate(&mut self) -> Recalculation {
        for cell in &mut self.cells {
            cell.state = CalcState::Pending;
            cell.dirty = false;
        }

        let mut pending: Vec<CellRef> = (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| CellRef::new(row, col)))
            .collect();
        let mut passes = 0;
        loop {
            for &cell in &pending {
                self.calculate(cell);
            }
            passes += 1;
            let before = pending.len();
            pending.retain(|&cell| self.state(cell) == Some(CalcState::Pending));
            if pending.is_empty() || pending.len() == before {
                break;
            }
            if passes == 1 {
                // Deepest cells first: in a row-major sweep they sit last.
                pending.reverse();
            }
        }

        // No progress: every remaining chain loops back on itself.
        for &cell in &pending {
            if let Some(idx) = self.index(cell) {
                self.finish(idx, Value::Error(ErrorKind::Recur));
            }
        }
        if passes > 1 {
            debug!("sweep settled after {passes} passes, {} cells left cyclic", pending.len());
        }

        let stats = Recalculation {
            cells: self.cells.len(),
            errors: self.cells.iter().filter(|c| c.value.is_error()).count(),
            changed: self.cells.iter().filter(|c| c.dirty).count(),
        };

        debug!(
            "recalculated {} cells: {} errors, {} changed",
            stats.cells, stats.errors, stats.changed
        );
        stats
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::allocate(DEFAULT_ROWS, DEFAULT_COLS, FunctionRegistry::with_builtins())
    }
}

impl Resolver for Sheet {
    fn resolve(&mut self, cell: CellRef) -> Value {
        self.calculate(cell)
    }
}
