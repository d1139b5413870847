//! Per-source listing with create/edit/delete for mutable sources.

use crate::format::{source_row, TableOptions};
use crate::state::App;
use crate::theme::source_color;
use crate::widgets::{EmployeeTable, FilterBar, FilterOption, Pagination};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use staffsync_core::{Source, Transport};

fn source_key(source: Source) -> char {
    match source {
        Source::Csv => 'c',
        Source::Mysql => 'm',
        Source::Postgresql => 'p',
    }
}

pub fn render<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let session = &app.dashboard.session;
    let counts = &app.dashboard.stats.source_counts;
    let filters: Vec<FilterOption> = Source::all()
        .iter()
        .map(|source| FilterOption {
            key: source_key(*source),
            label: format!("{} ({})", source.label(), counts.get(*source)),
            active: session.source_filter == Some(*source),
            style: Style::default().fg(source_color(Some(*source))),
        })
        .collect();
    FilterBar {
        title: "Source [Esc clears]",
        filters: &filters,
        active_style: Style::default()
            .fg(app.palette.primary)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        inactive_style: Style::default().fg(app.palette.text_dim),
    }
    .render(f, chunks[0]);

    let Some(listing) = &session.source_listing else {
        let hint = match session.source_filter {
            Some(source) => format!("No records loaded for {}.", source.label()),
            None => "Pick a source with c, m or p.".to_string(),
        };
        let widget = Paragraph::new(hint)
            .style(Style::default().fg(app.palette.text_dim))
            .block(Block::default().title("Employees").borders(Borders::ALL));
        f.render_widget(widget, chunks[1]);
        return;
    };

    let options = TableOptions::source(listing.is_read_only());
    let page = app.dashboard.source_page();
    let rows = page.rows();
    let mut title = format!("{} employees ({})", listing.source.label(), listing.total);
    if listing.is_read_only() {
        title.push_str(" read-only");
    } else {
        title.push_str(" [n] new");
    }
    EmployeeTable {
        title,
        options,
        rows: rows.iter().map(|e| source_row(e, options)).collect(),
        accents: Vec::new(),
        selected: (!rows.is_empty()).then_some(app.selected_row.min(rows.len() - 1)),
        empty_message: "No employees in this source.",
        header_style: Style::default()
            .fg(source_color(Some(listing.source)))
            .add_modifier(Modifier::BOLD),
        highlight_style: Style::default().bg(app.palette.bg_highlight),
        text_style: Style::default().fg(app.palette.text),
    }
    .render(f, chunks[1]);

    Pagination {
        index: session.source_cursor.index(),
        total_pages: page.total_pages(),
        style: Style::default().fg(app.palette.primary),
        disabled_style: Style::default().fg(app.palette.text_dim),
    }
    .render(f, chunks[2]);
}
