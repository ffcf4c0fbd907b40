pub mod board_view;
pub mod help_overlay;
pub mod modal;
pub mod people_view;
pub mod sidebar;
pub mod status_row;

mod helpers;
#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::{App, View};
use helpers::with_right_hint;

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // sidebar | main
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(sidebar::sidebar_width(app)),
            Constraint::Min(1),
        ])
        .split(area);
    sidebar::render_sidebar(frame, app, columns[0]);

    // Layout: title bar (1 row) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    render_title_bar(frame, app, chunks[0]);
    match app.view {
        View::Board => board_view::render_board_view(frame, app, chunks[1]),
        View::People => people_view::render_people_view(frame, app, chunks[1]),
    }

    if app.modal.is_open() {
        modal::render_modal(frame, app, area);
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let title = match app.view {
        View::Board => " Schedule",
        View::People => " People",
    };
    let spans = vec![Span::styled(
        title,
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let week = if app.view == View::Board {
        let mut label = app.week.label();
        if app.week == app.this_week {
            label.push_str(" (this week)");
        }
        format!("{} ", label)
    } else {
        let count = app.people.active().len();
        format!("{} active ", count)
    };
    let line = Line::from(with_right_hint(
        spans,
        Span::styled(week, Style::default().fg(app.theme.dim).bg(bg)),
        area.width as usize,
        Style::default().bg(bg),
    ));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}
