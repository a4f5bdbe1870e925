//! Loaders for the supplier export and the target dataset.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::debug;
use serde_json::{Map, Value as JsonValue};

use crate::{
    data::Value,
    io_utils,
    table::{Cell, Table},
};

/// Literal text the supplier uses for "no value".
pub const SUPPLIER_NULL_TOKEN: &str = "null";

/// Reads a JSON-lines supplier export into an EAV table.
///
/// Columns are the union of object keys in first-appearance order. JSON `null`
/// and the string `"null"` both become missing cells.
pub fn load_supplier_json(path: &Path, encoding: &'static Encoding) -> Result<Table> {
    let reader = BufReader::new(io_utils::open_text_reader(path, encoding)?);
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut records: Vec<Vec<(usize, Cell)>> = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Reading line {} of {path:?}", line_idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let object: Map<String, JsonValue> = serde_json::from_str(&line)
            .with_context(|| format!("Parsing line {} of {path:?}", line_idx + 1))?;
        let mut record = Vec::with_capacity(object.len());
        for (key, value) in object {
            let idx = *positions.entry(key.clone()).or_insert_with(|| {
                headers.push(key.clone());
                headers.len() - 1
            });
            let cell = json_cell(&value)
                .with_context(|| format!("Line {} field '{key}'", line_idx + 1))?;
            record.push((idx, cell));
        }
        records.push(record);
    }

    let mut table = Table::new(headers)?;
    let width = table.column_count();
    for record in records {
        let mut row: Vec<Cell> = vec![None; width];
        for (idx, cell) in record {
            row[idx] = cell;
        }
        table.push_row(row);
    }
    debug!("Loaded {} supplier record(s) from {path:?}", table.row_count());
    Ok(table)
}

fn json_cell(value: &JsonValue) -> Result<Cell> {
    Ok(match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s == SUPPLIER_NULL_TOKEN => None,
        JsonValue::String(s) => Some(Value::text(s.clone())),
        JsonValue::Number(n) => Some(Value::text(n.to_string())),
        JsonValue::Bool(b) => Some(Value::text(b.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            bail!("Nested JSON values are not supported")
        }
    })
}

/// Reads the target dataset; empty fields become missing cells.
pub fn load_target_table(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Table> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers of {path:?}"))?;
    let mut table = Table::new(headers).with_context(|| format!("Validating headers of {path:?}"))?;
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        table.push_row(
            decoded
                .into_iter()
                .map(|field| (!field.is_empty()).then(|| Value::String(field)))
                .collect(),
        );
    }
    Ok(table)
}

/// Distinct present values of `column`, in first-appearance order.
pub fn column_vocabulary(table: &Table, column: &str) -> Result<Vec<String>> {
    let values = table
        .column_values(column)
        .with_context(|| format!("Collecting vocabulary of target column '{column}'"))?;
    Ok(values
        .into_iter()
        .flatten()
        .map(Value::as_display)
        .unique()
        .collect())
}
