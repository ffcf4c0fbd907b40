use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View};

use super::helpers::centered_rect;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive help
    match app.view {
        View::Board => {
            lines.push(Line::from(Span::styled(" Board", header_style)));
            add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move between tasks and teams", key_style, desc_style);
            add_binding(&mut lines, " \u{2190}\u{2192}/hl", "Move between days", key_style, desc_style);
            add_binding(&mut lines, " [ ]", "Select member for new tasks", key_style, desc_style);
            add_binding(&mut lines, " Space/z", "Collapse / expand team", key_style, desc_style);
            add_binding(&mut lines, " < >", "Previous / next week", key_style, desc_style);
            add_binding(&mut lines, " T", "Back to this week", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" Tasks", header_style)));
            add_binding(&mut lines, " Enter", "Edit task / assign here", key_style, desc_style);
            add_binding(&mut lines, " n", "New assignment", key_style, desc_style);
            add_binding(&mut lines, " y", "Duplicate task", key_style, desc_style);
            add_binding(&mut lines, " x", "Delete task", key_style, desc_style);
            add_binding(&mut lines, " m", "Move task (hjkl, Enter drop)", key_style, desc_style);
            lines.push(Line::from(""));
        }
        View::People => {
            lines.push(Line::from(Span::styled(" People", header_style)));
            add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor", key_style, desc_style);
            add_binding(&mut lines, " a", "Toggle admin", key_style, desc_style);
            add_binding(&mut lines, " d", "Deactivate member", key_style, desc_style);
            add_binding(&mut lines, " r", "Reactivate member", key_style, desc_style);
            add_binding(&mut lines, " m", "Move to team (jk, Enter drop)", key_style, desc_style);
            lines.push(Line::from(""));
        }
    }

    // Global keys
    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " b / s", "Board / People view", key_style, desc_style);
    add_binding(&mut lines, " \\", "Collapse sidebar", key_style, desc_style);
    add_binding(&mut lines, " t", "Cycle theme", key_style, desc_style);
    add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
    add_binding(&mut lines, " q", "Quit", key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
