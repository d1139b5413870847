//! Popups drawn over the active view: form, delete confirmation, help and
//! record details.

use crate::format::{format_date, format_salary, format_timestamp, ABSENT};
use crate::state::{App, DetailRecord, EmployeeForm, FORM_LABELS};
use crate::theme::Palette;
use crate::views::centered_rect;
use crate::widgets::DetailPanel;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use staffsync_core::Transport;

pub fn render<T: Transport>(f: &mut Frame<'_>, app: &App<T>) {
    let area = f.size();
    if let Some(form) = &app.form {
        render_form(f, &app.palette, form, centered_rect(60, 70, area));
    } else if let Some(pending) = &app.dashboard.session.pending_delete {
        render_prompt(
            f,
            &app.palette,
            "Confirm deletion",
            &pending.prompt(),
            "[y] delete   [n] cancel",
            centered_rect(50, 25, area),
        );
    } else if let Some(modal) = &app.modal {
        render_prompt(
            f,
            &app.palette,
            &modal.title,
            &modal.message,
            "[Esc] close",
            centered_rect(60, 40, area),
        );
    } else if let Some(detail) = &app.detail {
        render_detail(f, &app.palette, detail, centered_rect(50, 50, area));
    }
}

fn render_prompt(
    f: &mut Frame<'_>,
    palette: &Palette,
    title: &str,
    message: &str,
    hint: &str,
    area: Rect,
) {
    let mut lines: Vec<Line> = message.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(palette.text_dim),
    )));
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(palette.bg_secondary).fg(palette.text))
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default().fg(palette.primary).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border_focus)),
        );
    f.render_widget(Clear, area);
    f.render_widget(widget, area);
}

fn render_form(f: &mut Frame<'_>, palette: &Palette, form: &EmployeeForm, area: Rect) {
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(form.mode.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border_focus))
        .style(Style::default().bg(palette.bg_secondary));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); form.fields.len()];
    constraints.push(Constraint::Min(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border = if focused {
            palette.border_focus
        } else {
            palette.border
        };
        let mut area_widget = field.clone();
        area_widget.set_block(
            Block::default()
                .title(FORM_LABELS[i])
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
        if !focused {
            area_widget.set_cursor_style(Style::default());
        }
        f.render_widget(&area_widget, chunks[i]);
    }

    let status = match &form.error {
        Some(error) => Line::from(Span::styled(error.clone(), Style::default().fg(palette.error))),
        None => Line::from(Span::styled(
            "Tab next field • Enter save • Esc cancel",
            Style::default().fg(palette.text_dim),
        )),
    };
    f.render_widget(
        Paragraph::new(status).wrap(Wrap { trim: true }),
        chunks[form.fields.len()],
    );
}

fn render_detail(f: &mut Frame<'_>, palette: &Palette, detail: &DetailRecord, area: Rect) {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| ABSENT.to_string());
    let (title, fields) = match detail {
        DetailRecord::Unified(e) => (
            "Unified employee",
            vec![
                ("ID", e.id.to_string()),
                ("Name", e.name.clone()),
                ("Email", e.email.clone()),
                ("Department", text(&e.department)),
                ("Salary", format_salary(e.salary)),
                ("Hired", format_date(e.hire_date)),
                ("Source", e.source.label().to_string()),
                ("Source ID", text(&e.source_id)),
                ("Updated", format_timestamp(Some(&e.updated_at))),
            ],
        ),
        DetailRecord::Source(source, e) => (
            source.label(),
            vec![
                ("ID", e.id.to_string()),
                ("Name", e.name.clone()),
                ("Email", e.email.clone()),
                ("Department", text(&e.department)),
                ("Salary", format_salary(e.salary)),
                ("Hired", format_date(e.hire_date)),
            ],
        ),
    };
    DetailPanel {
        title,
        fields,
        style: Style::default().fg(palette.secondary),
    }
    .render(f, area);
}
