//! Row formatting for employee tables.

use staffsync_core::{CalendarDate, SourceEmployee, Timestamp, UnifiedEmployee};

pub const ABSENT: &str = "-";

/// Which columns a table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    pub show_id: bool,
    pub show_source: bool,
    pub show_actions: bool,
}

impl TableOptions {
    /// Unified view: provenance and last update, no actions.
    pub fn unified() -> Self {
        Self {
            show_id: true,
            show_source: true,
            show_actions: false,
        }
    }

    /// Source listing. Read-only sources hide ids and actions.
    pub fn source(read_only: bool) -> Self {
        Self {
            show_id: !read_only,
            show_source: false,
            show_actions: !read_only,
        }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = Vec::new();
        if self.show_id {
            headers.push("ID");
        }
        headers.extend(["Name", "Email", "Department", "Salary", "Hired"]);
        if self.show_source {
            headers.extend(["Source", "Updated"]);
        }
        if self.show_actions {
            headers.push("Actions");
        }
        headers
    }
}

/// Rounded amount with space-grouped thousands, e.g. `1 250 000 FCFA`.
pub fn format_salary(salary: Option<f64>) -> String {
    match salary {
        Some(value) if value.is_finite() => {
            let rounded = value.round() as i64;
            let digits = rounded.unsigned_abs().to_string();
            let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push(' ');
                }
                grouped.push(ch);
            }
            let sign = if rounded < 0 { "-" } else { "" };
            format!("{}{} FCFA", sign, grouped)
        }
        _ => ABSENT.to_string(),
    }
}

/// `DD/MM/YYYY`.
pub fn format_date(date: Option<CalendarDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

/// `DD/MM/YYYY HH:MM:SS`.
pub fn format_timestamp(timestamp: Option<&Timestamp>) -> String {
    timestamp
        .map(|t| t.format("%d/%m/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| ABSENT.to_string())
}

fn text_or_absent(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => ABSENT.to_string(),
    }
}

pub fn unified_row(employee: &UnifiedEmployee, options: TableOptions) -> Vec<String> {
    let mut row = Vec::new();
    if options.show_id {
        row.push(employee.id.to_string());
    }
    row.push(employee.name.clone());
    row.push(employee.email.clone());
    row.push(text_or_absent(employee.department.as_deref()));
    row.push(format_salary(employee.salary));
    row.push(format_date(employee.hire_date));
    if options.show_source {
        row.push(employee.source.label().to_string());
        row.push(format_timestamp(Some(&employee.updated_at)));
    }
    if options.show_actions {
        row.push(String::new());
    }
    row
}

pub fn source_row(employee: &SourceEmployee, options: TableOptions) -> Vec<String> {
    let mut row = Vec::new();
    if options.show_id {
        row.push(employee.id.to_string());
    }
    row.push(employee.name.clone());
    row.push(employee.email.clone());
    row.push(text_or_absent(employee.department.as_deref()));
    row.push(format_salary(employee.salary));
    row.push(format_date(employee.hire_date));
    if options.show_actions {
        row.push("[e] edit  [d] delete".to_string());
    }
    row
}

/// `Page 2 / 5`, or `None` when a single page needs no pagination.
pub fn page_label(index: usize, total_pages: usize) -> Option<String> {
    if total_pages <= 1 {
        return None;
    }
    Some(format!("Page {} / {}", index + 1, total_pages))
}
