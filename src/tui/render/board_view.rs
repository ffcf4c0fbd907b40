use chrono::{Datelike, Local};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{Day, Task, Team};
use crate::ops::drag::CellTarget;
use crate::tui::app::{App, Mode};
use crate::util::unicode::fit_to_width;

use super::helpers::{pad_spans, scroll_for};

/// Width of the member column on the left of each team section
pub const MEMBER_COL: usize = 18;

/// Render the weekly board: a header of day columns, then one section per
/// team. Open sections list members on the left and task cards per day.
pub fn render_board_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let day_w = width.saturating_sub(MEMBER_COL) / Day::ALL.len();

    let mut lines: Vec<Line> = vec![header_line(app, day_w)];
    let mut cursor_line = 0;

    if app.tasks.query().data().is_none() && app.teams().is_empty() {
        let msg = match app.team_state.teams_query().error() {
            Some(e) => format!(" Could not load teams: {}", e),
            None => " Loading\u{2026}".to_string(),
        };
        lines.push(Line::from(Span::styled(
            msg,
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    } else if app.teams().is_empty() {
        lines.push(Line::from(Span::styled(
            " No teams yet. Add one with `rota team add <name>`",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    for (ti, team) in app.teams().iter().enumerate() {
        let on_team = ti == app.board.team;
        let open = app.team_state.is_open(&team.name);
        if on_team {
            cursor_line = lines.len();
        }
        lines.push(team_header(app, team, open, on_team, width));
        if !open {
            continue;
        }
        let section = team_section(app, team, on_team, day_w);
        if on_team {
            cursor_line += section.cursor_offset;
        }
        lines.extend(section.lines);
    }

    let scroll = scroll_for(cursor_line, area.height as usize, lines.len());
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn header_line<'a>(app: &App, day_w: usize) -> Line<'a> {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let today = Local::now().date_naive();
    let mut spans = vec![Span::styled(fit_to_width(" Team", MEMBER_COL), dim)];
    for day in Day::ALL {
        spans.push(Span::styled("\u{2502}", Style::default().fg(app.theme.border).bg(bg)));
        let label = fit_to_width(&format!(" {}", app.week.column_label(day)), day_w.saturating_sub(1));
        let is_today = app.week.date(day) == today && today.weekday().num_days_from_monday() < 5;
        let style = if is_today {
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn team_header<'a>(app: &App, team: &Team, open: bool, on_team: bool, width: usize) -> Line<'a> {
    let arrow = if open { "\u{25BE}" } else { "\u{25B8}" };
    let count = app.tasks.tasks().iter().filter(|t| t.team == team.name).count();
    let collapsed_cursor = on_team && !open && app.mode != Mode::Modal;
    let bg = if collapsed_cursor {
        app.theme.selection_bg
    } else {
        app.theme.surface
    };
    let fg = if on_team {
        app.theme.highlight
    } else {
        app.theme.text_bright
    };
    let mut spans = vec![
        Span::styled(
            format!(" {} {}", arrow, team.name),
            Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", count),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    pad_spans(&mut spans, width, Style::default().bg(bg));
    Line::from(spans)
}

struct Section<'a> {
    lines: Vec<Line<'a>>,
    /// Line of the cursor relative to the team header
    cursor_offset: usize,
}

fn team_section<'a>(app: &App, team: &Team, on_team: bool, day_w: usize) -> Section<'a> {
    let bg = app.theme.background;
    let members = app.team_state.members_of(&team.name);
    let cells: Vec<Vec<&Task>> = Day::ALL
        .iter()
        .map(|d| app.tasks.tasks_in(&team.name, *d))
        .collect();
    let most = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    // Two lines per card and per member
    let height = (most * 2).max(members.len() * 2);
    let cell_w = day_w.saturating_sub(1);

    let mut lines = Vec::with_capacity(height);
    let mut cursor_offset = 1;
    for r in 0..height {
        let slot = r / 2;
        let first = r % 2 == 0;
        let mut spans = Vec::new();

        let member = members.get(slot);
        let member_selected = on_team && slot == app.board.member && member.is_some();
        let (text, mut style) = match member {
            Some(m) if first => (
                format!(" {}", m.name),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            Some(m) => (
                format!(" {}", m.title),
                Style::default().fg(app.theme.dim).bg(bg),
            ),
            None => (String::new(), Style::default().bg(bg)),
        };
        if member_selected {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(fit_to_width(&text, MEMBER_COL), style));

        for (di, day) in Day::ALL.iter().enumerate() {
            spans.push(Span::styled(
                "\u{2502}",
                Style::default().fg(app.theme.border).bg(bg),
            ));
            let cell = &cells[di];
            let cursor_cell = on_team && app.board.day == *day;
            let hovered = app.board_drag.hover()
                == Some(&CellTarget {
                    day: *day,
                    team: team.name.clone(),
                });
            let cell_bg = if hovered { app.theme.drop_target_bg } else { bg };

            match cell.get(slot) {
                Some(task) => {
                    let selected = cursor_cell && app.board.slot == slot;
                    if selected && first {
                        cursor_offset = r + 1;
                    }
                    let card_bg = if selected && app.mode != Mode::Drag {
                        app.theme.selection_bg
                    } else {
                        cell_bg
                    };
                    card_line(app, task, first, card_bg, cell_w, &mut spans);
                }
                None if cursor_cell && cell.is_empty() && r == 0 && app.mode == Mode::Navigate => {
                    cursor_offset = 1;
                    spans.push(Span::styled(
                        fit_to_width(" + add", cell_w),
                        Style::default()
                            .fg(app.theme.highlight)
                            .bg(app.theme.selection_bg),
                    ));
                }
                None => {
                    spans.push(Span::styled(" ".repeat(cell_w), Style::default().bg(cell_bg)));
                }
            }
        }
        lines.push(Line::from(spans));
    }
    Section {
        lines,
        cursor_offset,
    }
}

/// One line of a two-line task card: title with a project color bar, or
/// the subtitle underneath
fn card_line<'a>(
    app: &App,
    task: &Task,
    first: bool,
    bg: ratatui::style::Color,
    width: usize,
    spans: &mut Vec<Span<'a>>,
) {
    let in_transit = app.board_drag.in_transit(&task.id);
    let color = app.theme.project_color(&task.color);
    let bar = if in_transit { "\u{21E2}" } else { "\u{258C}" };
    spans.push(Span::styled(bar, Style::default().fg(color).bg(bg)));

    let rest = width.saturating_sub(1);
    let (text, style) = if first {
        let marker = task.time_block.marker();
        let text = if marker.is_empty() {
            task.title.clone()
        } else {
            format!("{} {}", task.title, marker)
        };
        (text, Style::default().fg(app.theme.text_bright).bg(bg))
    } else {
        let sub = task.subtitle().unwrap_or(&task.assignee).to_string();
        (sub, Style::default().fg(app.theme.dim).bg(bg))
    };
    let style = if in_transit {
        style.fg(app.theme.dim).add_modifier(Modifier::DIM)
    } else {
        style
    };
    spans.push(Span::styled(fit_to_width(&text, rest), style));
}
