use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use super::app::{App, Mode};
use super::ui;

/// What the event loop should do after a key.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyResult {
    Continue,
    Redraw,
    Quit,
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match handle_key(app, key) {
                KeyResult::Continue => {}
                KeyResult::Redraw => terminal.clear()?,
                KeyResult::Quit => return Ok(()),
            }
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match app.mode {
        Mode::Normal => match key.code {
            KeyCode::Char('l') if ctrl => return KeyResult::Redraw,
            KeyCode::Char('h') | KeyCode::Left => app.move_cursor(0, -1),
            KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1, 0),
            KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => app.move_cursor(0, 1),
            KeyCode::Char('i') | KeyCode::Enter => app.start_edit(),
            KeyCode::Char('x') => app.clear_cell(),
            KeyCode::Char(':') => app.start_command(),
            _ => {}
        },
        Mode::Edit => match key.code {
            KeyCode::Char('w') if ctrl => app.delete_word(),
            KeyCode::Char(c) if !ctrl => app.insert_char(c),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Esc => app.cancel_edit(),
            _ => {}
        },
        Mode::Command => match key.code {
            KeyCode::Char(c) if !ctrl => app.command_buffer.push(c),
            KeyCode::Backspace => {
                if app.command_buffer.pop().is_none() {
                    app.cancel_command();
                }
            }
            KeyCode::Enter => app.execute_command(),
            KeyCode::Esc => app.cancel_command(),
            _ => {}
        },
    }

    if app.should_quit {
        KeyResult::Quit
    } else {
        KeyResult::Continue
    }
}
