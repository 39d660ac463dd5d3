use std::collections::HashMap;

use serde_json::Value;

use super::lead::{LeadRecord, LEAD_COLUMNS};

/// Renders leads as CSV in [`LEAD_COLUMNS`] order. Columns no lead carries
/// are left out; a lead missing a column another lead has gets an empty cell.
pub fn leads_to_csv(leads: &[LeadRecord]) -> String {
    let rows: Vec<HashMap<&str, Value>> = leads
        .iter()
        .map(|lead| lead.cells().into_iter().collect())
        .collect();

    let columns: Vec<&str> = LEAD_COLUMNS
        .iter()
        .copied()
        .filter(|column| rows.iter().any(|row| row.contains_key(column)))
        .collect();

    if columns.is_empty() {
        return String::new();
    }

    let mut csv = String::new();
    push_line(&mut csv, columns.iter().map(|c| c.to_string()));
    for row in rows.iter() {
        push_line(
            &mut csv,
            columns
                .iter()
                .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
        );
    }

    csv
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn push_line(csv: &mut String, cells: impl Iterator<Item = String>) {
    let line: Vec<String> = cells.map(|cell| escape(&cell)).collect();
    csv.push_str(&line.join(","));
    csv.push('\n');
}

fn escape(cell: &str) -> String {
    match cell.contains([',', '"', '\n', '\r']) {
        true => format!("\"{}\"", cell.replace('"', "\"\"")),
        false => cell.to_string(),
    }
}
