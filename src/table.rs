//! In-memory table shared by every pipeline stage.
//!
//! A [`Table`] is an ordered list of unique column names plus rows of
//! `Option<Value>` cells, each row exactly as wide as the header list. The
//! transformation methods consume `self` or build a fresh table so that no
//! stage ever edits a snapshot another stage still holds.

use std::collections::{HashMap, HashSet};

use crate::{
    data::Value,
    error::{ReconcileError, ReconcileResult},
};

pub type Cell = Option<Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> ReconcileResult<Self> {
        ensure_unique(&headers)?;
        Ok(Self {
            headers,
            rows: Vec::new(),
        })
    }

    /// Builds a table from rows, padding short rows with missing cells.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> ReconcileResult<Self> {
        let mut table = Self::new(headers)?;
        for row in rows {
            table.push_row(row);
        }
        Ok(table)
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> ReconcileResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ReconcileError::UnknownColumn {
                column: name.to_string(),
            })
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn column_values(&self, name: &str) -> ReconcileResult<Vec<&Cell>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Appends `values` as column `name`, replacing the column if it already exists.
    pub fn with_column(mut self, name: &str, values: Vec<Cell>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        self
    }

    /// Adds a column holding `value` in every row.
    pub fn with_constant_column(self, name: &str, value: Cell) -> Self {
        let values = vec![value; self.rows.len()];
        self.with_column(name, values)
    }

    /// Drops every column named in `columns`; names not present are ignored.
    pub fn drop_columns(mut self, columns: &[String]) -> Self {
        let doomed: HashSet<&str> = columns.iter().map(String::as_str).collect();
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !doomed.contains(h.as_str()))
            .collect();
        self.headers = self
            .headers
            .into_iter()
            .zip(&keep)
            .filter_map(|(h, k)| k.then_some(h))
            .collect();
        for row in &mut self.rows {
            let cells = std::mem::take(row);
            *row = cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(c, k)| k.then_some(c))
                .collect();
        }
        self
    }

    /// Renames columns according to `renames` (old name to new name).
    pub fn rename_columns(mut self, renames: &HashMap<String, String>) -> ReconcileResult<Self> {
        for header in &mut self.headers {
            if let Some(target) = renames.get(header) {
                *header = target.clone();
            }
        }
        ensure_unique(&self.headers)?;
        Ok(self)
    }

    /// Returns a table holding exactly `columns`, in that order.
    pub fn select(&self, columns: &[String]) -> ReconcileResult<Self> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<ReconcileResult<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Table::from_rows(columns.to_vec(), rows)
    }

    pub fn map_column<F>(mut self, name: &str, mut f: F) -> ReconcileResult<Self>
    where
        F: FnMut(usize, Cell) -> ReconcileResult<Cell>,
    {
        let idx = self.require_column(name)?;
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            let cell = row[idx].take();
            row[idx] = f(row_idx, cell)?;
        }
        Ok(self)
    }
}

fn ensure_unique(headers: &[String]) -> ReconcileResult<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for header in headers {
        if !seen.insert(header.as_str()) {
            return Err(ReconcileError::DuplicateColumn {
                column: header.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![Some(Value::text("1")), None, Some(Value::text("x"))],
                vec![Some(Value::text("2")), Some(Value::text("y"))],
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_rows_pads_short_rows() {
        let table = sample();
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.rows()[1][2], None);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = Table::new(vec!["a".into(), "a".into()]).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::DuplicateColumn {
                column: "a".into()
            }
        );
    }

    #[test]
    fn drop_rename_and_select_compose() {
        let renames = HashMap::from([("b".to_string(), "bee".to_string())]);
        let table = sample()
            .drop_columns(&["a".to_string(), "zzz".to_string()])
            .rename_columns(&renames)
            .unwrap();
        assert_eq!(table.headers(), &["bee".to_string(), "c".to_string()]);

        let reordered = table.select(&["c".into(), "bee".into()]).unwrap();
        assert_eq!(reordered.cell(1, "bee"), Some(&Value::text("y")));
        assert_eq!(reordered.headers()[0], "c");
    }

    #[test]
    fn with_column_replaces_existing_values() {
        let table = sample().with_column("a", vec![None, Some(Value::Integer(5))]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(1, "a"), Some(&Value::Integer(5)));
        assert_eq!(table.cell(0, "a"), None);
    }

    #[test]
    fn select_reports_unknown_column() {
        let err = sample().select(&["nope".into()]).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownColumn { .. }));
    }
}
