use crossterm::event::{KeyCode, KeyEvent};

use crate::model::{Day, UNASSIGNED};
use crate::ops::drag::CellTarget;
use crate::ops::tasks::MoveTask;
use crate::tui::app::{App, Mode, View};

pub(super) fn handle_drag(app: &mut App, key: KeyEvent) {
    match app.view {
        View::Board => handle_board_drag(app, key),
        View::People => handle_people_drag(app, key),
    }
}

fn handle_board_drag(app: &mut App, key: KeyEvent) {
    let Some(hover) = app.board_drag.hover().cloned() else {
        cancel(app);
        return;
    };
    let team_index = app
        .teams()
        .iter()
        .position(|t| t.name == hover.team)
        .unwrap_or(0);
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => hover_cell(app, hover.day.prev(), team_index),
        KeyCode::Char('l') | KeyCode::Right => hover_cell(app, hover.day.next(), team_index),
        KeyCode::Char('j') | KeyCode::Down => {
            let last = app.teams().len().saturating_sub(1);
            hover_cell(app, hover.day, (team_index + 1).min(last));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            hover_cell(app, hover.day, team_index.saturating_sub(1));
        }
        KeyCode::Enter | KeyCode::Char('m') => drop_task(app, hover),
        KeyCode::Esc => cancel(app),
        _ => {}
    }
}

fn hover_cell(app: &mut App, day: Day, team_index: usize) {
    let Some(team) = app.teams().get(team_index).map(|t| t.name.clone()) else {
        return;
    };
    app.board_drag.drag_over(CellTarget { day, team });
}

/// Drop the carried task on `target` and follow it with the cursor
fn drop_task(app: &mut App, target: CellTarget) {
    let outcome = {
        let mut guard = app.board_drag.guard();
        guard.drop_on(target)
    };
    app.mode = Mode::Navigate;
    let Some(outcome) = outcome else {
        return;
    };
    let mv = MoveTask {
        task_id: outcome.item_id,
        day: outcome.target.day,
        team: outcome.target.team,
    };
    if app.tasks.move_task(app.store.as_ref(), &mut app.notices, &mv) {
        if let Some(index) = app.teams().iter().position(|t| t.name == mv.team) {
            app.board.team = index;
        }
        app.board.day = mv.day;
        app.board.slot = 0;
    }
}

fn handle_people_drag(app: &mut App, key: KeyEvent) {
    let groups = app.people_groups();
    if groups.is_empty() {
        cancel(app);
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.people_target = (app.people_target + 1).min(groups.len() - 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.people_target = app.people_target.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('m') => {
            let target = groups[app.people_target.min(groups.len() - 1)].clone();
            drop_member(app, target);
            return;
        }
        KeyCode::Esc => {
            cancel(app);
            return;
        }
        _ => return,
    }
    let target = groups[app.people_target.min(groups.len() - 1)].clone();
    app.people_drag.drag_over(target);
}

fn drop_member(app: &mut App, group: String) {
    let outcome = {
        let mut guard = app.people_drag.guard();
        guard.drop_on(group)
    };
    app.mode = Mode::Navigate;
    let Some(outcome) = outcome else {
        return;
    };
    let unchanged = app
        .people
        .find(&outcome.item_id)
        .is_some_and(|m| m.team.as_deref().unwrap_or(UNASSIGNED) == outcome.target);
    if unchanged {
        tracing::debug!(member = %outcome.item_id, "dropped on own team");
        return;
    }
    app.people.reassign_team(
        app.store.as_ref(),
        &mut app.notices,
        &outcome.item_id,
        &outcome.target,
    );
}

/// Abandon the drag; nothing is written
fn cancel(app: &mut App) {
    app.board_drag.drag_end();
    app.people_drag.drag_end();
    app.mode = Mode::Navigate;
}
