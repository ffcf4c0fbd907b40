use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{App, View};
use crate::util::unicode::truncate_to_width;

pub const EXPANDED_WIDTH: u16 = 22;
pub const COLLAPSED_WIDTH: u16 = 4;

pub fn sidebar_width(app: &App) -> u16 {
    if app.sidebar_expanded {
        EXPANDED_WIDTH
    } else {
        COLLAPSED_WIDTH
    }
}

/// Navigation sidebar: board name, views, theme and the signed-in member
pub fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.surface;
    let inner_w = area.width.saturating_sub(1) as usize;
    let expanded = app.sidebar_expanded;

    let mut lines: Vec<Line> = Vec::new();
    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    if expanded {
        lines.push(Line::from(Span::styled(
            truncate_to_width(&format!(" {}", app.config.board.name), inner_w),
            title_style,
        )));
    } else {
        lines.push(Line::from(Span::styled(" \u{2261}", title_style)));
    }
    lines.push(Line::from(""));

    for (view, label, key) in [(View::Board, "Board", "b"), (View::People, "People", "s")] {
        let active = app.view == view;
        let style = if active {
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        let marker = if active { "\u{25B8}" } else { " " };
        let text = if expanded {
            format!(" {} {}", marker, label)
        } else {
            format!(" {}", key)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    lines.push(Line::from(""));
    if expanded {
        lines.push(Line::from(vec![
            Span::styled(" Theme ", Style::default().fg(app.theme.dim).bg(bg)),
            Span::styled(
                app.theme_pref.as_str(),
                Style::default().fg(app.theme.text).bg(bg),
            ),
        ]));
    }

    // Profile footer pinned to the bottom
    let footer = match app.profile.profile() {
        Some(p) if expanded => Some(format!(
            " {} {}",
            p.member.initials(),
            truncate_to_width(&p.member.name, inner_w.saturating_sub(5))
        )),
        Some(p) => Some(format!(" {}", p.member.initials())),
        None if expanded && app.profile.user().is_none() => Some(" not signed in".to_string()),
        None => None,
    };
    if let Some(footer) = footer {
        let used = lines.len();
        let bottom = area.height.saturating_sub(1) as usize;
        for _ in used..bottom {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            footer,
            Style::default().fg(app.theme.text).bg(bg),
        )));
    }

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
