//! Plain-text rendering of the employee table.

use shared::domain::{CollectionState, CollectionStatus, EmployeeRecord};

const HEADERS: [&str; 8] = [
    "ID",
    "Employee ID",
    "Name",
    "Email",
    "Phone",
    "Position",
    "Date of Joining",
    "Salary",
];

fn row(record: &EmployeeRecord) -> [String; 8] {
    [
        record.id.to_string(),
        record.employee_id.clone(),
        record.name.clone(),
        record.email.clone().unwrap_or_default(),
        record.phone_number.clone(),
        record.position.clone(),
        record.date_of_joining.to_string(),
        record.salary.to_string(),
    ]
}

/// A failed load replaces the table with the error; stale rows are not shown
/// underneath it.
pub fn render_collection(state: &CollectionState) -> String {
    if state.is_loading() {
        return "Loading employees...".to_string();
    }
    if state.status == CollectionStatus::Failed {
        return format!(
            "Failed to load employees: {}",
            state.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    if state.records.is_empty() {
        return "No employees found.".to_string();
    }

    let rows: Vec<[String; 8]> = state.records.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize; 8]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
