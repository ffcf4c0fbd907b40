use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Day;
use crate::ops::drag::CellTarget;
use crate::tui::app::{App, Mode};

use super::common::handle_global;

pub(super) fn handle_board(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_down(app),
        KeyCode::Char('k') | KeyCode::Up => move_up(app),
        KeyCode::Char('h') | KeyCode::Left => {
            let day = app.board.day.prev();
            set_day(app, day);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            let day = app.board.day.next();
            set_day(app, day);
        }
        KeyCode::Char(']') => {
            let last = app.team_members().len().saturating_sub(1);
            app.board.member = (app.board.member + 1).min(last);
        }
        KeyCode::Char('[') => app.board.member = app.board.member.saturating_sub(1),
        KeyCode::Char(' ') | KeyCode::Char('z') => toggle_team(app),
        KeyCode::Char('<') | KeyCode::Char(',') => app.week = app.week.prev(),
        KeyCode::Char('>') | KeyCode::Char('.') => app.week = app.week.next(),
        KeyCode::Char('T') => app.week = app.this_week,
        KeyCode::Enter => open_selected(app),
        KeyCode::Char('n') => open_create(app),
        KeyCode::Char('y') => duplicate_selected(app),
        KeyCode::Char('x') | KeyCode::Delete => delete_selected(app),
        KeyCode::Char('m') => start_drag(app),
        _ => {
            handle_global(app, key);
        }
    }
}

fn team_is_open(app: &App, index: usize) -> bool {
    app.teams()
        .get(index)
        .is_some_and(|t| app.team_state.is_open(&t.name))
}

fn move_down(app: &mut App) {
    let open = team_is_open(app, app.board.team);
    if open && app.board.slot + 1 < app.cell_tasks().len() {
        app.board.slot += 1;
        return;
    }
    if app.board.team + 1 < app.teams().len() {
        app.board.team += 1;
        app.board.slot = 0;
        app.board.member = 0;
    }
}

fn move_up(app: &mut App) {
    if team_is_open(app, app.board.team) && app.board.slot > 0 {
        app.board.slot -= 1;
        return;
    }
    if app.board.team > 0 {
        app.board.team -= 1;
        app.board.member = 0;
        app.board.slot = if team_is_open(app, app.board.team) {
            app.cell_tasks().len().saturating_sub(1)
        } else {
            0
        };
    }
}

fn set_day(app: &mut App, day: Day) {
    app.board.day = day;
    let len = app.cell_tasks().len();
    app.board.slot = app.board.slot.min(len.saturating_sub(1));
}

fn toggle_team(app: &mut App) {
    let Some(name) = app.current_team().map(|t| t.name.clone()) else {
        return;
    };
    app.team_state.toggle_team(&name);
    app.board.slot = 0;
}

/// Enter: edit the task under the cursor, or assign into the empty slot
fn open_selected(app: &mut App) {
    let Some(task) = app.selected_task().cloned() else {
        open_create(app);
        return;
    };
    let target = app.edit_target(&task);
    app.modal.open_edit(target, &task);
    app.mode = Mode::Modal;
}

fn open_create(app: &mut App) {
    let Some(team) = app.current_team().map(|t| t.name.clone()) else {
        return;
    };
    if !app.team_state.is_open(&team) {
        return;
    }
    let Some(target) = app.create_target() else {
        app.notices
            .error("Error", format!("{} has no members to assign", team));
        return;
    };
    app.modal.open_create(target);
    app.mode = Mode::Modal;
}

fn duplicate_selected(app: &mut App) {
    let Some(id) = app.selected_task().map(|t| t.id.clone()) else {
        return;
    };
    app.tasks
        .duplicate(app.store.as_ref(), &mut app.notices, &id);
}

fn delete_selected(app: &mut App) {
    let Some(id) = app.selected_task().map(|t| t.id.clone()) else {
        return;
    };
    if app.tasks.delete(app.store.as_ref(), &mut app.notices, &id) {
        app.board.slot = app.board.slot.saturating_sub(1);
    }
}

/// Pick up the task under the cursor; the hover starts on its own cell
fn start_drag(app: &mut App) {
    let Some(task) = app.selected_task() else {
        return;
    };
    let id = task.id.clone();
    let start = CellTarget {
        day: task.day,
        team: task.team.clone(),
    };
    app.board_drag.drag_start(&id);
    app.board_drag.drag_over(start);
    app.mode = Mode::Drag;
}
