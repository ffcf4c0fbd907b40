use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode, PeopleRow};

use super::common::handle_global;

pub(super) fn handle_people(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let last = app.people_selectable().len().saturating_sub(1);
            app.people_cursor = (app.people_cursor + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.people_cursor = app.people_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') => app.people_cursor = 0,
        KeyCode::Char('G') => {
            app.people_cursor = app.people_selectable().len().saturating_sub(1);
        }
        KeyCode::Char('a') => toggle_admin(app),
        KeyCode::Char('d') => deactivate(app),
        KeyCode::Char('r') => reactivate(app),
        KeyCode::Char('m') => start_drag(app),
        _ => {
            handle_global(app, key);
        }
    }
}

fn toggle_admin(app: &mut App) {
    let Some((id, current)) = app.selected_person().map(|m| (m.id.clone(), m.is_admin)) else {
        return;
    };
    app.people
        .toggle_admin(app.store.as_ref(), &mut app.notices, &id, current);
}

fn deactivate(app: &mut App) {
    let Some(member) = app.selected_person() else {
        return;
    };
    if !member.is_active() {
        return;
    }
    let id = member.id.clone();
    app.people
        .deactivate(app.store.as_ref(), &mut app.notices, &id);
}

fn reactivate(app: &mut App) {
    let Some(member) = app.selected_person() else {
        return;
    };
    if member.is_active() {
        return;
    }
    let id = member.id.clone();
    let team_id = member.team_id.clone();
    app.people
        .reactivate(app.store.as_ref(), &mut app.notices, &id, team_id);
}

/// Pick up the member under the cursor, hovering their current group
fn start_drag(app: &mut App) {
    let rows = app.people_selectable();
    let Some(PeopleRow::Member { id, group }) = rows.get(app.people_cursor) else {
        return;
    };
    let groups = app.people_groups();
    app.people_target = groups.iter().position(|g| g == group).unwrap_or(0);
    app.people_drag.drag_start(id);
    app.people_drag.drag_over(group.clone());
    app.mode = Mode::Drag;
}
