//! Status indicator widget.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// A titled box with one prominent value and an optional caption, used for
/// the statistics cards.
pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub caption: Option<String>,
    pub style: Style,
}

impl StatusIndicator {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            self.status.clone(),
            self.style.add_modifier(Modifier::BOLD),
        ))];
        if let Some(caption) = &self.caption {
            lines.push(Line::from(caption.clone()));
        }
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .title(self.title.as_str())
                .borders(Borders::ALL),
        );
        f.render_widget(paragraph, area);
    }
}
