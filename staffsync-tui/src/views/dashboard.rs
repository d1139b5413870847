//! Dashboard view: statistics cards, per-source chart, sync status and a
//! preview of the unified view.

use crate::etl::EtlPhase;
use crate::format::{format_salary, format_timestamp};
use crate::state::App;
use crate::theme::source_color;
use crate::views::unified_table;
use crate::widgets::{Pagination, ProgressBar, SourceBarChart, StatusIndicator};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use staffsync_core::{Source, Transport};

pub fn render<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    render_cards(f, app, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    SourceBarChart {
        title: "Employees per source (unified)",
        state: app.dashboard.stats.chart.state(),
        text_style: Style::default().fg(app.palette.text),
        error_style: Style::default().fg(app.palette.error),
    }
    .render(f, middle[0]);
    render_sync_panel(f, app, middle[1]);

    let session = &app.dashboard.session;
    let title = format!(
        "Unified employees ({})",
        app.dashboard.cache.reported_total()
    );
    unified_table(app, &session.preview_page, title).render(f, rows[2]);

    Pagination {
        index: session.preview_cursor.index(),
        total_pages: session.preview_page.total_pages(),
        style: Style::default().fg(app.palette.primary),
        disabled_style: Style::default().fg(app.palette.text_dim),
    }
    .render(f, rows[3]);
}

fn render_cards<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let stats = &app.dashboard.stats;
    let count = |value: Option<f64>| {
        value
            .map(|v| format!("{}", v.round() as i64))
            .unwrap_or_else(|| "-".to_string())
    };

    let entries = [
        ("Employees", stats.total_employees().to_string(), None),
        (
            "Departments",
            count(stats.global.department_count),
            Some(format!("{} sources", count(stats.global.source_count))),
        ),
        (
            "Average salary",
            format_salary(stats.global.average_salary),
            Some(format!(
                "{} to {}",
                format_salary(stats.global.min_salary),
                format_salary(stats.global.max_salary)
            )),
        ),
        (
            "Last sync",
            format_timestamp(stats.last_sync.as_ref().and_then(|s| s.last_update.as_ref())),
            stats
                .last_sync
                .as_ref()
                .and_then(|s| s.total)
                .map(|t| format!("{} records", t.round() as i64)),
        ),
    ];
    for ((title, value, caption), slot) in entries.into_iter().zip(cards.iter()) {
        StatusIndicator {
            title: title.to_string(),
            status: value,
            caption,
            style: Style::default().fg(app.palette.primary),
        }
        .render(f, *slot);
    }
}

fn render_sync_panel<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let stats = &app.dashboard.stats;
    let mut lines = vec![Line::from(Span::styled(
        format!("{:<12}{:>10}{:>10}", "Source", "Origin", "Unified"),
        Style::default().fg(app.palette.text_dim),
    ))];
    for source in Source::all() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<12}", source.label()),
                Style::default().fg(source_color(Some(*source))),
            ),
            Span::raw(format!(
                "{:>10}{:>10}",
                stats.source_counts.get(*source),
                stats.unified_counts.get(*source)
            )),
        ]));
    }
    let pending = stats.source_counts.total() != stats.unified_counts.total();
    if pending {
        lines.push(Line::from(Span::styled(
            "Sources differ from the unified view. Press s to synchronize.",
            Style::default().fg(app.palette.warning),
        )));
    }
    let table = Paragraph::new(lines).block(
        Block::default()
            .title("Source counts")
            .borders(Borders::ALL),
    );
    f.render_widget(table, parts[0]);

    let etl = &app.dashboard.etl;
    let wait = etl.wait().as_secs_f32();
    let (value, label) = match etl.phase() {
        EtlPhase::Waiting { .. } => {
            let remaining = etl.remaining().map(|d| d.as_secs_f32()).unwrap_or(0.0);
            (wait - remaining, format!("Refreshing in {:.0}s", remaining.ceil()))
        }
        EtlPhase::Triggering => (0.0, "Triggering...".to_string()),
        EtlPhase::Refreshing => (wait, "Refreshing...".to_string()),
        EtlPhase::Idle => (
            0.0,
            format!("Idle, {} run(s) this session", etl.completed_runs()),
        ),
    };
    ProgressBar {
        title: "Synchronization".to_string(),
        value,
        max: wait,
        label,
        style: Style::default().fg(app.palette.secondary),
    }
    .render(f, parts[1]);
}
