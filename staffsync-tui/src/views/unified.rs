//! Full unified-employee table.

use crate::state::App;
use crate::views::unified_table;
use crate::widgets::Pagination;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    Frame,
};
use staffsync_core::Transport;

pub fn render<T: Transport>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let session = &app.dashboard.session;
    let cache = &app.dashboard.cache;
    let title = if cache.reported_total() > cache.len() {
        format!(
            "Unified view ({} of {} loaded)",
            cache.len(),
            cache.reported_total()
        )
    } else {
        format!("Unified view ({})", cache.reported_total())
    };
    unified_table(app, &session.table_page, title).render(f, chunks[0]);

    Pagination {
        index: session.table_cursor.index(),
        total_pages: session.table_page.total_pages(),
        style: Style::default().fg(app.palette.primary),
        disabled_style: Style::default().fg(app.palette.text_dim),
    }
    .render(f, chunks[1]);
}
