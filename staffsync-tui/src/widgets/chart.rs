//! Bar chart of employees per source.

use crate::stats::ChartState;
use crate::theme::source_color;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct SourceBarChart<'a> {
    pub title: &'a str,
    pub state: &'a ChartState,
    pub text_style: Style,
    pub error_style: Style,
}

impl<'a> SourceBarChart<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title(self.title).borders(Borders::ALL);
        match self.state {
            ChartState::Chart(chart) => {
                let bars: Vec<Bar> = chart
                    .bars
                    .iter()
                    .map(|bar| {
                        let color = source_color(bar.source);
                        Bar::default()
                            .value(bar.value)
                            .label(Line::from(bar.label.clone()))
                            .style(Style::default().fg(color))
                            .value_style(Style::default().bg(color).fg(ratatui::style::Color::Black))
                    })
                    .collect();
                let width = if chart.bars.is_empty() {
                    1
                } else {
                    let inner = area.width.saturating_sub(2) as usize;
                    ((inner / chart.bars.len()).saturating_sub(2)).clamp(3, 16) as u16
                };
                let widget = BarChart::default()
                    .block(block)
                    .data(BarGroup::default().bars(&bars))
                    .bar_width(width)
                    .bar_gap(2)
                    .label_style(self.text_style);
                f.render_widget(widget, area);
            }
            ChartState::Fallback(message) => {
                let widget = Paragraph::new(format!("Chart unavailable: {}", message))
                    .style(self.error_style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block);
                f.render_widget(widget, area);
            }
            ChartState::Empty => {
                let widget = Paragraph::new("No data")
                    .style(self.text_style)
                    .alignment(Alignment::Center)
                    .block(block);
                f.render_widget(widget, area);
            }
        }
    }
}
