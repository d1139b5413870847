//! Pagination line: previous/next hints around the page label.

use crate::format::page_label;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct Pagination {
    pub index: usize,
    pub total_pages: usize,
    pub style: Style,
    pub disabled_style: Style,
}

impl Pagination {
    /// Nothing is drawn when everything fits on one page.
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let Some(label) = page_label(self.index, self.total_pages) else {
            return;
        };
        let has_previous = self.index > 0;
        let has_next = self.index + 1 < self.total_pages;
        let pick = |enabled: bool| if enabled { self.style } else { self.disabled_style };

        let line = Line::from(vec![
            Span::styled("« g  ‹ h ", pick(has_previous)),
            Span::styled(format!(" {} ", label), self.style),
            Span::styled(" l ›  G »", pick(has_next)),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}
