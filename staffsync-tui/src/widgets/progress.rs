//! Progress bar widget for the post-sync countdown.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct ProgressBar {
    pub title: String,
    pub value: f32,
    pub max: f32,
    pub label: String,
    pub style: Style,
}

impl ProgressBar {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let ratio = if self.max <= 0.0 {
            0.0
        } else {
            (self.value / self.max).clamp(0.0, 1.0)
        };

        let gauge = Gauge::default()
            .block(Block::default().title(self.title.as_str()).borders(Borders::ALL))
            .gauge_style(self.style)
            .label(self.label.as_str())
            .ratio(ratio as f64);
        f.render_widget(gauge, area);
    }
}
