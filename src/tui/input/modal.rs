use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::assignment::ModalField;
use crate::ops::tasks::{NewTask, TaskPatch};
use crate::tui::app::{App, Mode};

/// Ctrl+Enter / Cmd+Enter, plus Ctrl+S for terminals that can't report
/// modified Enter
fn is_save_accelerator(key: &KeyEvent) -> bool {
    let modified = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);
    match key.code {
        KeyCode::Enter => modified,
        KeyCode::Char('s') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub(super) fn handle_modal(app: &mut App, key: KeyEvent) {
    if is_save_accelerator(&key) {
        save(app);
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.modal.close();
            app.mode = Mode::Navigate;
            return;
        }
        KeyCode::Tab => {
            app.modal.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.modal.focus_prev();
            return;
        }
        _ => {}
    }

    match app.modal.focus() {
        ModalField::Filter => match key.code {
            KeyCode::Down => app.modal.focus_next(),
            KeyCode::Enter => {
                if app.modal.select_at_cursor() {
                    app.modal.focus_next();
                    app.modal.focus_next();
                }
            }
            KeyCode::Backspace => app.modal.backspace(),
            KeyCode::Char(c) => app.modal.type_char(c),
            _ => {}
        },
        ModalField::Projects => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.modal.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => app.modal.cursor_up(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                app.modal.select_at_cursor();
            }
            _ => {}
        },
        ModalField::TimeBlock => match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                let block = app.modal.time_block().prev();
                app.modal.set_time_block(block);
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ') => {
                let block = app.modal.time_block().next();
                app.modal.set_time_block(block);
            }
            KeyCode::Enter => app.modal.focus_next(),
            _ => {}
        },
        ModalField::Description => match key.code {
            KeyCode::Enter => save(app),
            KeyCode::Backspace => app.modal.backspace(),
            KeyCode::Char(c) => app.modal.type_char(c),
            _ => {}
        },
    }
}

/// Save the modal: create or update the task it was opened for
fn save(app: &mut App) {
    if !app.modal.can_save() {
        tracing::debug!("save without a project ignored");
        return;
    }
    let Some(draft) = app.modal.save() else {
        return;
    };
    app.mode = Mode::Navigate;
    match draft.task_id {
        Some(id) => {
            let patch = TaskPatch {
                project: Some(draft.project.name),
                time_block: Some(draft.time_block),
                description: Some(draft.description.unwrap_or_default()),
                ..Default::default()
            };
            app.tasks.update(
                app.store.as_ref(),
                &app.catalog,
                &mut app.notices,
                &id,
                patch,
            );
        }
        None => {
            let target = draft.target;
            let new = NewTask {
                project: draft.project.name,
                time_block: draft.time_block,
                description: draft.description,
                day: target.day,
                team: target.team,
                assignee_id: target.member_id,
                assignee: target.member_name,
            };
            app.tasks
                .create(app.store.as_ref(), &app.catalog, &mut app.notices, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accelerators() {
        let ctrl_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
        let cmd_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::SUPER);
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(is_save_accelerator(&ctrl_enter));
        assert!(is_save_accelerator(&cmd_enter));
        assert!(is_save_accelerator(&ctrl_s));
        assert!(!is_save_accelerator(&enter));
        assert!(!is_save_accelerator(&s));
    }
}
