//! Column reconciliation against a target schema.
//!
//! A [`ReconcilePlan`] partitions the working table's columns into deletions
//! and renames, and lists the target columns that must be synthesized with a
//! placeholder. [`apply`] executes the plan, checks that the result lines up
//! with the target column list, reorders, and finally coerces the configured
//! scalar columns.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    error::{ReconcileError, ReconcileResult},
    table::{Cell, Table},
};

/// Target column name to the working column it comes from; `None` means the
/// target column has no source and is filled with a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrespondenceMapping {
    entries: BTreeMap<String, Option<String>>,
}

impl CorrespondenceMapping {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Entries with a non-empty source column.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(target, source)| {
            source
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| (target.as_str(), s))
        })
    }

    /// Target columns declared without a source.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, source)| source.as_deref().is_none_or(str::is_empty))
            .map(|(target, _)| target.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_delete: Vec<String>,
    /// Existing column name to target column name.
    pub to_rename: HashMap<String, String>,
    pub to_synthesize: Vec<String>,
}

impl ReconcilePlan {
    pub fn build(table_columns: &[String], mapping: &CorrespondenceMapping) -> Self {
        let sources: HashSet<&str> = mapping.renames().map(|(_, source)| source).collect();
        let to_delete = table_columns
            .iter()
            .filter(|column| !sources.contains(column.as_str()))
            .cloned()
            .collect();
        let to_rename = mapping
            .renames()
            .map(|(target, source)| (source.to_string(), target.to_string()))
            .collect();
        let to_synthesize = mapping.placeholders().map(str::to_string).collect();
        Self {
            to_delete,
            to_rename,
            to_synthesize,
        }
    }

    /// Rename pairs sorted by source, for stable reporting.
    pub fn sorted_renames(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .to_rename
            .iter()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionTarget {
    Integer,
    Float,
}

impl fmt::Display for CoercionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionTarget::Integer => write!(f, "integer"),
            CoercionTarget::Float => write!(f, "float"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coercion {
    pub column: String,
    #[serde(rename = "type")]
    pub target: CoercionTarget,
}

impl Coercion {
    pub fn new(column: impl Into<String>, target: CoercionTarget) -> Self {
        Self {
            column: column.into(),
            target,
        }
    }

    pub fn defaults() -> Vec<Coercion> {
        vec![
            Coercion::new("manufacture_year", CoercionTarget::Integer),
            Coercion::new("mileage", CoercionTarget::Float),
            Coercion::new("manufacture_month", CoercionTarget::Integer),
        ]
    }
}

pub fn apply(
    table: Table,
    plan: &ReconcilePlan,
    target_columns: &[String],
    placeholder: &str,
    coercions: &[Coercion],
) -> ReconcileResult<Table> {
    let mut table = table
        .drop_columns(&plan.to_delete)
        .rename_columns(&plan.to_rename)?;
    for column in &plan.to_synthesize {
        table = table.with_constant_column(column, Some(Value::text(placeholder)));
    }

    if table.column_count() != target_columns.len() {
        return Err(ReconcileError::ColumnCountMismatch {
            expected: target_columns.len(),
            actual: table.column_count(),
        });
    }
    let present: HashSet<&str> = table.headers().iter().map(String::as_str).collect();
    let wanted: HashSet<&str> = target_columns.iter().map(String::as_str).collect();
    if present != wanted {
        let missing = target_columns
            .iter()
            .filter(|c| !present.contains(c.as_str()))
            .cloned()
            .collect();
        let unexpected = table
            .headers()
            .iter()
            .filter(|c| !wanted.contains(c.as_str()))
            .cloned()
            .collect();
        return Err(ReconcileError::ColumnSetMismatch {
            missing,
            unexpected,
        });
    }

    let mut table = table.select(target_columns)?;
    for coercion in coercions {
        table = table.map_column(&coercion.column, |row, cell| {
            coerce_cell(cell, coercion.target).map_err(|value| ReconcileError::Coercion {
                column: coercion.column.clone(),
                row: row + 1,
                value,
                target: coercion.target,
            })
        })?;
    }
    Ok(table)
}

/// On failure returns the offending raw text (`None` when the cell was missing).
fn coerce_cell(cell: Cell, target: CoercionTarget) -> Result<Cell, Option<String>> {
    let raw = match cell {
        None if target == CoercionTarget::Float => return Ok(None),
        None => return Err(None),
        Some(Value::Integer(i)) => {
            return Ok(Some(match target {
                CoercionTarget::Integer => Value::Integer(i),
                CoercionTarget::Float => Value::Float(i as f64),
            }));
        }
        Some(Value::Float(f)) if target == CoercionTarget::Float => {
            return Ok(Some(Value::Float(f)));
        }
        Some(other) => other.as_display(),
    };
    let trimmed = raw.trim();
    let parsed = match target {
        CoercionTarget::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
        CoercionTarget::Float => trimmed.parse::<f64>().ok().map(Value::Float),
    };
    parsed.map(Some).ok_or(Some(raw))
}
