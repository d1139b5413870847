//! Common view rendering helpers.

use crate::cache::Page;
use crate::format::{unified_row, TableOptions};
use crate::state::App;
use crate::theme::source_color;
use crate::widgets::EmployeeTable;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
};
use staffsync_core::{Transport, UnifiedEmployee};

/// A rectangle of `percent_x` by `percent_y` centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Table of one page of the unified view, with source-coloured provenance.
pub fn unified_table<'a, T: Transport>(
    app: &'a App<T>,
    page: &Page<UnifiedEmployee>,
    title: String,
) -> EmployeeTable<'a> {
    let options = TableOptions::unified();
    let rows = page.rows();
    EmployeeTable {
        title,
        options,
        rows: rows.iter().map(|e| unified_row(e, options)).collect(),
        accents: rows
            .iter()
            .map(|e| {
                Style::default()
                    .fg(source_color(Some(e.source)))
                    .add_modifier(Modifier::BOLD)
            })
            .collect(),
        selected: (!rows.is_empty()).then_some(app.selected_row.min(rows.len() - 1)),
        empty_message: app.dashboard.empty_unified_hint(),
        header_style: Style::default()
            .fg(app.palette.primary)
            .add_modifier(Modifier::BOLD),
        highlight_style: Style::default().bg(app.palette.bg_highlight),
        text_style: Style::default().fg(app.palette.text),
    }
}
