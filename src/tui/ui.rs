//! UI rendering

use super::app::{App, Mode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tally_engine::engine::{CellRef, Value};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 4;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 4;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = split_main_chunks(f.area());

    // Update visible dimensions based on actual size
    let grid_area = chunks[1];
    let available_width = grid_area.width.saturating_sub(ROW_HEADER_WIDTH + 2) as usize;
    let available_height = grid_area.height.saturating_sub(3) as usize; // header + borders

    app.visible_cols = (available_width / (app.col_width + GRID_COLUMN_SPACING as usize)).max(1);
    app.visible_rows = (available_height / app.row_height.max(1) as usize).max(1);
    app.update_viewport();

    draw_formula_bar(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let content = match app.mode {
        Mode::Edit => format!("{}: {}│", app.current_cell_ref(), app.edit_buffer),
        Mode::Command => format!(":{}│", app.command_buffer),
        Mode::Normal => app.cell_summary(),
    };

    let title = match app.mode {
        Mode::Edit => " Edit ",
        Mode::Command => " Command ",
        Mode::Normal => " Cell ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(match app.mode {
            Mode::Edit => Color::Yellow,
            Mode::Command => Color::Cyan,
            Mode::Normal => Color::White,
        }));

    let paragraph = Paragraph::new(content).block(block);
    f.render_widget(paragraph, area);
}

fn visible_col_range(app: &App) -> std::ops::Range<usize> {
    app.viewport_col..(app.viewport_col + app.visible_cols).min(app.sheet.cols())
}

fn visible_row_range(app: &App) -> std::ops::Range<usize> {
    app.viewport_row..(app.viewport_row + app.visible_rows).min(app.sheet.rows())
}

fn draw_grid(f: &mut Frame, app: &mut App, area: Rect) {
    let header_style = Style::default()
        .fg(Color::Black)
        .bg(Color::White)
        .add_modifier(Modifier::BOLD);

    // Build header row
    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for col in visible_col_range(app) {
        let style = if col == app.cursor_col {
            header_style
        } else {
            Style::default().fg(Color::DarkGray)
        };
        header_cells.push(Cell::from(CellRef::col_to_letters(col)).style(style));
    }
    let header = Row::new(header_cells).height(1);

    // Build data rows
    let mut rows = Vec::new();
    let mut shown = Vec::new();
    for row in visible_row_range(app) {
        let row_style = if row == app.cursor_row {
            header_style
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(row_style)];

        for col in visible_col_range(app) {
            let cell_ref = CellRef::new(row, col);
            let display = app.sheet.display_value(cell_ref, app.col_width);
            let is_error = app.sheet.value(cell_ref).is_some_and(Value::is_error);

            let style = if row == app.cursor_row && col == app.cursor_col {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if is_error {
                Style::default().fg(Color::Red)
            } else if app.sheet.is_dirty(cell_ref) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            cells.push(Cell::from(display).style(style));
            shown.push(cell_ref);
        }

        rows.push(Row::new(cells).height(app.row_height));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)]; // Row header
    widths.extend(visible_col_range(app).map(|_| Constraint::Length(app.col_width as u16)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Tally "))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);

    // Changed values are highlighted for one frame only.
    for cell_ref in shown {
        app.sheet.clear_dirty(cell_ref);
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.mode {
        Mode::Normal => "hjkl:move  i:edit  x:clear  ::command  :q quit",
        Mode::Edit => "Enter:commit  Esc:cancel  C-w:delete word",
        Mode::Command => "Enter:run  Esc:cancel",
    };

    let status = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else {
        format!(
            "{}x{}  |  {}",
            app.sheet.cols(),
            app.sheet.rows(),
            help
        )
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let spans = vec![Span::styled(status, style)];
    let paragraph = Paragraph::new(Line::from(spans));
    f.render_widget(paragraph, area);
}
