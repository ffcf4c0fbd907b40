use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::notice::NoticeLevel;
use crate::tui::app::{App, Mode, View};

use super::helpers::with_right_hint;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    render_status_row_at(frame, app, area, Instant::now());
}

pub(super) fn render_status_row_at(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (spans, hint) = match app.mode {
        Mode::Drag => (drag_spans(app), "Enter drop  Esc cancel"),
        Mode::Modal => (Vec::new(), "Ctrl+Enter save  Esc cancel"),
        Mode::Navigate => {
            let spans = match app.notices.latest(now) {
                Some(notice) => {
                    let color = match notice.level {
                        NoticeLevel::Info => app.theme.green,
                        NoticeLevel::Error => app.theme.red,
                    };
                    vec![
                        Span::styled(format!(" {}: ", notice.title), Style::default().fg(color).bg(bg)),
                        Span::styled(notice.text.clone(), Style::default().fg(app.theme.text).bg(bg)),
                    ]
                }
                None => load_error(app)
                    .map(|e| vec![Span::styled(format!(" {}", e), Style::default().fg(app.theme.red).bg(bg))])
                    .unwrap_or_default(),
            };
            (spans, "? help")
        }
    };

    let line = Line::from(with_right_hint(
        spans,
        Span::styled(format!("{} ", hint), dim),
        width,
        Style::default().bg(bg),
    ));
    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn drag_spans<'a>(app: &App) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let text = Style::default().fg(app.theme.text).bg(bg);
    let accent = Style::default().fg(app.theme.highlight).bg(bg);
    match app.view {
        View::Board => {
            let title = app
                .board_drag
                .dragged()
                .and_then(|id| app.tasks.find(id))
                .map(|t| t.title.clone())
                .unwrap_or_default();
            let target = app
                .board_drag
                .hover()
                .map(|c| format!("{} {}", c.team, c.day))
                .unwrap_or_default();
            vec![
                Span::styled(format!(" Moving {} ", title), text),
                Span::styled(format!("\u{2192} {}", target), accent),
            ]
        }
        View::People => {
            let name = app
                .people_drag
                .dragged()
                .and_then(|id| app.people.find(id))
                .map(|m| m.name.clone())
                .unwrap_or_default();
            let target = app.people_drag.hover().cloned().unwrap_or_default();
            vec![
                Span::styled(format!(" Moving {} ", name), text),
                Span::styled(format!("\u{2192} {}", target), accent),
            ]
        }
    }
}

/// A failed fetch with nothing cached to fall back on
fn load_error(app: &App) -> Option<String> {
    let tasks = app.tasks.query();
    if tasks.data().is_none()
        && let Some(e) = tasks.error()
    {
        return Some(format!("Could not load tasks: {}", e));
    }
    let members = app.team_state.members_query();
    if members.data().is_none()
        && let Some(e) = members.error()
    {
        return Some(format!("Could not load members: {}", e));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::Table;
    use crate::model::Day;
    use crate::ops::drag::CellTarget;
    use crate::tui::render::test_helpers::*;

    fn status(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, app, area);
        })
    }

    #[test]
    fn latest_notice_shown() {
        let mut app = seeded_app();
        app.notices.info("Success", "Task moved to Design Tue");
        let out = status(&app);
        assert!(out.contains("Success: Task moved to Design Tue"));
        assert!(out.contains("? help"));
    }

    #[test]
    fn notice_expires() {
        let mut app = seeded_app();
        app.notices.error("Error", "Failed to move task");
        let later = Instant::now() + crate::ops::notice::NOTICE_TTL * 2;
        let out = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row_at(frame, &app, area, later);
        });
        assert!(!out.contains("Failed"));
    }

    #[test]
    fn drag_shows_target() {
        let mut app = seeded_app();
        app.mode = Mode::Drag;
        app.board_drag.drag_start("task-1");
        app.board_drag.drag_over(CellTarget {
            day: Day::Thu,
            team: "Engineering".into(),
        });
        let out = status(&app);
        assert!(out.contains("Moving Marketing Strategy"));
        assert!(out.contains("Engineering Thu"));
    }

    #[test]
    fn failed_load_surfaces() {
        let store = seeded_store();
        store.fail_reads(Table::Tasks, true);
        let app = app_with(store);
        let out = status(&app);
        assert!(out.contains("Could not load tasks"));
    }
}
