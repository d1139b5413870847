//! View rendering dispatch.

pub mod dashboard;
pub mod helpers;
pub mod overlay;
pub mod sources;
pub mod unified;

pub use helpers::{centered_rect, unified_table};

use crate::etl::EtlPhase;
use crate::nav::View;
use crate::state::App;
use staffsync_core::Transport;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view<T: Transport>(f: &mut Frame<'_>, app: &App<T>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    f.render_widget(
        Block::default().style(Style::default().bg(app.palette.bg).fg(app.palette.text)),
        f.size(),
    );

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Dashboard => dashboard::render(f, app, layout[1]),
        View::Unified => unified::render(f, app, layout[1]),
        View::Sources => sources::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
    overlay::render(f, app);
}

fn etl_status(phase: EtlPhase) -> &'static str {
    match phase {
        EtlPhase::Idle => "ETL: idle",
        EtlPhase::Triggering => "ETL: triggering",
        EtlPhase::Waiting { .. } => "ETL: waiting",
        EtlPhase::Refreshing => "ETL: refreshing",
    }
}

fn render_header<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let mut spans = vec![Span::styled(
        "STAFFSYNC ",
        Style::default()
            .fg(app.palette.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (i, view) in View::all().iter().enumerate() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.palette.bg)
                .bg(app.palette.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.palette.text_dim)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} {} ", i + 1, view.title()), style));
    }
    spans.push(Span::styled(
        format!("  | {} | {}", etl_status(app.dashboard.etl.phase()), app.config.api_base_url),
        Style::default().fg(app.palette.text_dim),
    ));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.palette.border)),
    );
    f.render_widget(header, area);
}

fn render_footer<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let help = "1/2/3 views • j/k move • h/l page • s ETL • r refresh • t theme • ? help • q quit";
    let (text, style) = match app.dashboard.messages.latest() {
        Some(note) => (
            format!("{}: {}  [x dismiss]", note.level.label(), note.message),
            Style::default().fg(app.palette.level_color(note.level)),
        ),
        None => (help.to_string(), Style::default().fg(app.palette.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.palette.border)),
        )
        .style(style);
    f.render_widget(footer, area);
}
