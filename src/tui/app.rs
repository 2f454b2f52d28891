//! Application state and logic.
//!
//! This module contains the main [`App`] struct which holds the sheet, cursor
//! position, viewport and editing buffers. The app operates in different
//! [`Mode`]s (Normal, Edit, Command) similar to Vim's modal editing.

use tally_engine::builtins::BUILTINS;
use tally_engine::engine::{CellRef, Sheet};

use crate::config::Config;

/// Modal editing state for the application.
///
/// - [`Normal`](Mode::Normal): Navigate and execute single-key commands
/// - [`Edit`](Mode::Edit): Edit cell contents
/// - [`Command`](Mode::Command): Enter ex-style commands (`:q`, `:B7`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
    Command,
}

/// Main application state container.
pub struct App {
    /// The spreadsheet
    pub sheet: Sheet,
    /// Current cursor position (column)
    pub cursor_col: usize,
    /// Current cursor position (row)
    pub cursor_row: usize,
    /// Viewport offset (column)
    pub viewport_col: usize,
    /// Viewport offset (row)
    pub viewport_row: usize,
    /// Number of visible columns
    pub visible_cols: usize,
    /// Number of visible rows
    pub visible_rows: usize,
    /// Current mode
    pub mode: Mode,
    /// Edit buffer for cell editing
    pub edit_buffer: String,
    /// Command buffer for command mode
    pub command_buffer: String,
    /// Status message to display
    pub status_message: String,
    /// Column width for display
    pub col_width: usize,
    /// Terminal lines per grid row
    pub row_height: u16,
    /// Set by `:q`
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> tally_engine::Result<Self> {
        let mut sheet = Sheet::new(config.rows, config.cols)?;
        sheet.recalculate();
        Ok(App {
            sheet,
            cursor_col: 0,
            cursor_row: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 20,
            mode: Mode::Normal,
            edit_buffer: String::new(),
            command_buffer: String::new(),
            status_message: String::new(),
            col_width: config.column_width,
            row_height: config.row_height,
            should_quit: false,
        })
    }

    pub fn current_cell_ref(&self) -> CellRef {
        CellRef::new(self.cursor_row, self.cursor_col)
    }

    /// Move the cursor, clamped to the sheet.
    pub fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let max_row = self.sheet.rows().saturating_sub(1);
        let max_col = self.sheet.cols().saturating_sub(1);
        self.cursor_row = self.cursor_row.saturating_add_signed(d_row).min(max_row);
        self.cursor_col = self.cursor_col.saturating_add_signed(d_col).min(max_col);
        self.update_viewport();
    }

    /// Scroll the viewport so the cursor stays visible.
    pub fn update_viewport(&mut self) {
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + self.visible_cols {
            self.viewport_col = self.cursor_col + 1 - self.visible_cols.max(1);
        }
        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + self.visible_rows {
            self.viewport_row = self.cursor_row + 1 - self.visible_rows.max(1);
        }
    }

    pub fn start_edit(&mut self) {
        let cell = self.current_cell_ref();
        self.edit_buffer = self.sheet.raw_text(cell).unwrap_or_default().to_string();
        self.status_message.clear();
        self.mode = Mode::Edit;
    }

    pub fn insert_char(&mut self, c: char) {
        self.edit_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.edit_buffer.pop();
    }

    /// Delete the word before the end of the buffer: trailing non-word
    /// characters first, then the word characters before them.
    pub fn delete_word(&mut self) {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        while self.edit_buffer.ends_with(|c: char| !is_word(c)) {
            self.edit_buffer.pop();
        }
        while self.edit_buffer.ends_with(is_word) {
            self.edit_buffer.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer.clear();
        self.mode = Mode::Normal;
    }

    /// Store the edit buffer in the current cell and recalculate.
    /// A formula that does not parse is rejected and editing continues.
    pub fn commit_edit(&mut self) {
        let input = std::mem::take(&mut self.edit_buffer);
        if let Some(body) = input.strip_prefix('=')
            && input.trim_start().parse::<i64>().is_err()
            && let Err(err) = self.sheet.validate(body)
        {
            self.status_message = format!("Error: {err}");
            self.edit_buffer = input;
            return;
        }

        let cell = self.current_cell_ref();
        match self.sheet.set_raw_text(cell, input) {
            Ok(()) => {
                self.status_message.clear();
                self.recalculate();
            }
            Err(err) => self.status_message = format!("Error: {err}"),
        }
        self.mode = Mode::Normal;
    }

    pub fn clear_cell(&mut self) {
        let cell = self.current_cell_ref();
        match self.sheet.set_raw_text(cell, "") {
            Ok(()) => self.recalculate(),
            Err(err) => self.status_message = format!("Error: {err}"),
        }
    }

    fn recalculate(&mut self) {
        let stats = self.sheet.recalculate();
        if stats.errors > 0 {
            self.status_message = format!("{} cell(s) with errors", stats.errors);
        }
    }

    pub fn start_command(&mut self) {
        self.command_buffer.clear();
        self.status_message.clear();
        self.mode = Mode::Command;
    }

    pub fn cancel_command(&mut self) {
        self.command_buffer.clear();
        self.mode = Mode::Normal;
    }

    pub fn execute_command(&mut self) {
        let command = std::mem::take(&mut self.command_buffer);
        self.mode = Mode::Normal;
        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (None, _) => {}
            (Some("q" | "q!" | "quit"), None) => self.should_quit = true,
            (Some("help" | "functions"), None) => {
                let names: Vec<&str> = BUILTINS.iter().map(|b| b.name).collect();
                self.status_message = format!("Functions: {}", names.join(" "));
            }
            (Some("help"), Some(name)) => self.describe_function(name),
            (Some(target), None) => self.goto(target),
            (Some(_), Some(_)) => {
                self.status_message = format!("Error: Unknown command: {}", command.trim());
            }
        }
    }

    fn describe_function(&mut self, name: &str) {
        self.status_message = match BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name)) {
            Some(spec) => format!("{} ({} args): {}", spec.name, spec.arity, spec.description),
            None => format!("Error: No function named {name}"),
        };
    }

    fn goto(&mut self, target: &str) {
        match target.parse::<CellRef>() {
            Ok(cell) if self.sheet.contains(cell) => {
                self.cursor_row = cell.row;
                self.cursor_col = cell.col;
                self.update_viewport();
            }
            Ok(cell) => self.status_message = format!("Error: cell {cell} is outside the sheet"),
            Err(_) => self.status_message = format!("Error: Unknown command: {target}"),
        }
    }

    /// Formula bar text for the cell under the cursor in Normal mode.
    pub fn cell_summary(&self) -> String {
        let cell = self.current_cell_ref();
        let raw = self.sheet.raw_text(cell).unwrap_or_default();
        if let Some(err) = self.sheet.parse_error(cell) {
            return format!("{cell}: {raw}    [{err}]");
        }
        let refs = self.sheet.references(cell);
        if refs.is_empty() {
            format!("{cell}: {raw}")
        } else {
            let refs: Vec<String> = refs.iter().map(CellRef::encode).collect();
            format!("{cell}: {raw}    [uses {}]", refs.join(", "))
        }
    }
}
