use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::TimeBlock;
use crate::ops::assignment::{ModalField, ModalState};
use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::helpers::centered_rect;

/// Render the assignment modal on top of the board
pub fn render_modal(frame: &mut Frame, app: &App, area: Rect) {
    let modal = &app.modal;
    let overlay = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay);

    let bg = app.theme.background;
    let inner_w = overlay.width.saturating_sub(2) as usize;
    let text = Style::default().fg(app.theme.text).bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let label = |field: ModalField, name: &'static str| {
        let style = if modal.focus() == field {
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            dim
        };
        Span::styled(name, style)
    };
    let caret = |field: ModalField| {
        if modal.focus() == field {
            Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg))
        } else {
            Span::raw("")
        }
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        label(ModalField::Filter, " Search  "),
        Span::styled(modal.filter().to_string(), text),
        caret(ModalField::Filter),
    ]));
    lines.push(Line::from(""));

    lines.push(Line::from(label(ModalField::Projects, " Project")));
    let selected_id = modal.project().map(|p| p.id.clone());
    let projects = modal.filtered_projects();
    if projects.is_empty() {
        lines.push(Line::from(Span::styled("   No matching projects", dim)));
    }
    for (i, project) in projects.iter().enumerate() {
        let under_cursor = modal.focus() == ModalField::Projects && i == modal.cursor();
        let row_bg = if under_cursor {
            app.theme.selection_bg
        } else {
            bg
        };
        let mark = if selected_id.as_deref() == Some(project.id.as_str()) {
            "\u{2713}"
        } else {
            " "
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", mark),
                Style::default().fg(app.theme.green).bg(row_bg),
            ),
            Span::styled(
                "\u{25CF} ",
                Style::default()
                    .fg(app.theme.project_color(&project.color))
                    .bg(row_bg),
            ),
            Span::styled(
                truncate_to_width(&project.name, inner_w.saturating_sub(5)),
                Style::default().fg(app.theme.text_bright).bg(row_bg),
            ),
        ]));
    }
    if let Some(title) = modal.fallback_title() {
        lines.push(Line::from(Span::styled(
            format!("   Current: {} (not in catalog)", title),
            Style::default().fg(app.theme.red).bg(bg),
        )));
    }
    lines.push(Line::from(""));

    let mut blocks = vec![label(ModalField::TimeBlock, " Time    ")];
    for block in TimeBlock::ALL {
        let style = if block == modal.time_block() {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            text
        };
        blocks.push(Span::styled(format!(" {} ", block.label()), style));
        blocks.push(Span::styled(" ", text));
    }
    lines.push(Line::from(blocks));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        label(ModalField::Description, " Notes   "),
        Span::styled(modal.description().to_string(), text),
        caret(ModalField::Description),
    ]));
    lines.push(Line::from(""));

    let save_hint = if modal.can_save() {
        Span::styled(" Ctrl+Enter save", Style::default().fg(app.theme.highlight).bg(bg))
    } else {
        Span::styled(" Pick a project to save", dim)
    };
    lines.push(Line::from(vec![
        save_hint,
        Span::styled("  Tab next field  Esc cancel", dim),
    ]));

    let verb = match modal.state() {
        ModalState::OpenForEdit { .. } => "Edit",
        _ => "Assign",
    };
    let title = format!(" {}: {} ", verb, modal.heading());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            truncate_to_width(&title, inner_w),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.border).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, overlay);
}
