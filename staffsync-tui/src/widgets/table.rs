//! Employee table widget.

use crate::format::TableOptions;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Pre-formatted rows plus the column set they were built for.
pub struct EmployeeTable<'a> {
    pub title: String,
    pub options: TableOptions,
    pub rows: Vec<Vec<String>>,
    /// Per-row accent for the provenance column, when shown.
    pub accents: Vec<Style>,
    pub selected: Option<usize>,
    pub empty_message: &'a str,
    pub header_style: Style,
    pub highlight_style: Style,
    pub text_style: Style,
}

impl<'a> EmployeeTable<'a> {
    fn widths(&self) -> Vec<Constraint> {
        self.options
            .headers()
            .iter()
            .map(|header| match *header {
                "ID" => Constraint::Length(6),
                "Name" => Constraint::Min(14),
                "Email" => Constraint::Min(18),
                "Department" => Constraint::Length(14),
                "Salary" => Constraint::Length(16),
                "Hired" => Constraint::Length(11),
                "Source" => Constraint::Length(11),
                "Updated" => Constraint::Length(20),
                _ => Constraint::Length(22),
            })
            .collect()
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title(self.title.as_str()).borders(Borders::ALL);
        if self.rows.is_empty() {
            let widget = Paragraph::new(self.empty_message)
                .style(self.text_style)
                .block(block);
            f.render_widget(widget, area);
            return;
        }

        let source_column = self
            .options
            .headers()
            .iter()
            .position(|h| *h == "Source");
        let header = Row::new(self.options.headers()).style(self.header_style);
        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, values)| {
                let cells: Vec<Cell> = values
                    .iter()
                    .enumerate()
                    .map(|(col, value)| {
                        let style = match (source_column, self.accents.get(i)) {
                            (Some(c), Some(accent)) if c == col => *accent,
                            _ => self.text_style,
                        };
                        Cell::from(value.clone()).style(style)
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        let table = Table::new(rows, self.widths())
            .header(header)
            .block(block)
            .highlight_style(self.highlight_style.add_modifier(Modifier::BOLD))
            .highlight_symbol("› ");
        let mut state = TableState::default().with_selected(self.selected);
        f.render_stateful_widget(table, area, &mut state);
    }
}
