mod board;
mod common;
mod drag;
mod modal;
mod people;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode, View};

use board::handle_board;
use common::normalize_key;
use drag::handle_drag;
use modal::handle_modal;
use people::handle_people;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);

    // Help overlay intercepts all input
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => match app.view {
            View::Board => handle_board(app, key),
            View::People => handle_people(app, key),
        },
        Mode::Drag => handle_drag(app, key),
        Mode::Modal => handle_modal(app, key),
    }
}
