use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::TeamMember;
use crate::tui::app::{App, Mode, PeopleRow};
use crate::util::unicode::fit_to_width;

use super::helpers::{pad_spans, scroll_for};

const NAME_COL: usize = 22;
const ROLE_COL: usize = 22;

/// Render member management: active members grouped by team, then the
/// deactivated list.
pub fn render_people_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;

    let query = app.people.query();
    if query.data().is_none() {
        let msg = match query.error() {
            Some(e) => format!(" Could not load people: {}", e),
            None => " Loading\u{2026}".to_string(),
        };
        lines.push(Line::from(Span::styled(
            msg,
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    let selectable = app.people_selectable();
    let selected = selectable.get(app.people_cursor);
    let hover = app.people_drag.hover();

    for row in app.people_rows() {
        match &row {
            PeopleRow::Group(name) => {
                let count = app
                    .people
                    .grouped(app.teams())
                    .iter()
                    .find(|g| &g.team == name)
                    .map_or(0, |g| g.members.len());
                let hovered = hover == Some(name);
                let hbg = if hovered {
                    app.theme.drop_target_bg
                } else {
                    app.theme.surface
                };
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                let mut spans = vec![
                    Span::styled(
                        format!(" {}", name),
                        Style::default()
                            .fg(app.theme.text_bright)
                            .bg(hbg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", count), Style::default().fg(app.theme.dim).bg(hbg)),
                ];
                pad_spans(&mut spans, width, Style::default().bg(hbg));
                lines.push(Line::from(spans));
            }
            PeopleRow::DeactivatedHeader => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    " Deactivated",
                    Style::default()
                        .fg(app.theme.dim)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            PeopleRow::Member { id, .. } | PeopleRow::Deactivated { id } => {
                let Some(member) = app.people.find(id) else {
                    continue;
                };
                let is_cursor = selected == Some(&row);
                if is_cursor {
                    cursor_line = lines.len();
                }
                lines.push(member_line(app, member, is_cursor, width));
            }
        }
    }

    let scroll = scroll_for(cursor_line, area.height as usize, lines.len());
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn member_line<'a>(app: &App, member: &TeamMember, is_cursor: bool, width: usize) -> Line<'a> {
    let in_transit = app.people_drag.in_transit(&member.id);
    let bg = if is_cursor && app.mode != Mode::Drag {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let (name_fg, meta_fg) = if in_transit || !member.is_active() {
        (app.theme.dim, app.theme.dim)
    } else {
        (app.theme.text_bright, app.theme.text)
    };
    let marker = if in_transit { "\u{21E2}" } else { " " };

    let mut spans = vec![
        Span::styled(
            format!("{} {:<3}", marker, member.initials()),
            Style::default().fg(app.theme.highlight).bg(bg),
        ),
        Span::styled(
            fit_to_width(&member.name, NAME_COL),
            Style::default().fg(name_fg).bg(bg),
        ),
        Span::styled(
            fit_to_width(&member.title, ROLE_COL),
            Style::default().fg(meta_fg).bg(bg),
        ),
        Span::styled(
            fit_to_width(member.email.as_deref().unwrap_or(""), 26),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    if member.is_admin {
        spans.push(Span::styled(
            " admin",
            Style::default()
                .fg(app.theme.green)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
    }
    pad_spans(&mut spans, width, Style::default().bg(bg));
    Line::from(spans)
}
