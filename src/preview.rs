//! Terminal rendering of tables and reconciliation plans.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{data::render_cell, reconcile::ReconcilePlan, table::Table};

/// Renders `rows` as left-aligned columns separated by two spaces.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", separator.join("  "));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn render_preview(table: &Table, limit: usize) -> String {
    let rows = table
        .rows()
        .iter()
        .take(limit)
        .map(|row| row.iter().map(render_cell).collect())
        .collect::<Vec<Vec<String>>>();
    render_table(table.headers(), &rows)
}

pub fn print_preview(table: &Table, limit: usize) {
    print!("{}", render_preview(table, limit));
}

pub fn render_plan(plan: &ReconcilePlan) -> String {
    let mut rows = Vec::new();
    for column in &plan.to_delete {
        rows.push(vec!["delete".to_string(), column.clone(), String::new()]);
    }
    for (source, target) in plan.sorted_renames() {
        rows.push(vec!["rename".to_string(), source.to_string(), target.to_string()]);
    }
    for column in &plan.to_synthesize {
        rows.push(vec!["synthesize".to_string(), String::new(), column.clone()]);
    }
    let headers = vec![
        "action".to_string(),
        "source".to_string(),
        "target".to_string(),
    ];
    render_table(&headers, &rows)
}

pub fn print_plan(plan: &ReconcilePlan) {
    print!("{}", render_plan(plan));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn render_table_aligns_columns() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Alice".to_string()],
            vec!["2".to_string(), "Bob".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["id  name", "---  -----", "1   Alice", "2   Bob"]);
    }

    #[test]
    fn render_table_normalizes_control_characters() {
        let headers = vec!["note".to_string()];
        let rows = vec![vec!["line1\nline2\tvalue".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert_eq!(rendered.lines().nth(2), Some("line1 line2 value"));
    }

    #[test]
    fn plan_lists_every_action() {
        let plan = ReconcilePlan {
            to_delete: vec!["junk".into()],
            to_rename: HashMap::from([("Km".to_string(), "mileage".to_string())]),
            to_synthesize: vec!["city".into()],
        };
        let rendered = render_plan(&plan);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("delete"));
        assert!(lines[3].contains("Km") && lines[3].contains("mileage"));
        assert!(lines[4].ends_with("city"));
    }
}
