//! Lookup-driven normalization of categorical columns.
//!
//! One [`map_categorical`] serves every call site; what differs between them is
//! the [`KeyStrategy`] used to derive a lookup key from the raw value and the
//! [`FallbackPolicy`] applied when the key is not found.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Value, case_fold},
    error::ReconcileResult,
    table::{Cell, Table},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyStrategy {
    /// First whitespace-delimited token, case-folded.
    FirstToken,
    /// Whole value, case-folded.
    Folded,
}

impl KeyStrategy {
    pub fn key(&self, raw: &str) -> String {
        match self {
            KeyStrategy::FirstToken => raw
                .split_whitespace()
                .next()
                .map(case_fold)
                .unwrap_or_default(),
            KeyStrategy::Folded => case_fold(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Replace unmatched values with a fixed category.
    Default(String),
    /// Keep unmatched values and append a marker suffix.
    Marker { suffix: String },
}

impl FallbackPolicy {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            FallbackPolicy::Default(value) => value.clone(),
            FallbackPolicy::Marker { suffix } => format!("{raw}{suffix}"),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FallbackPolicy::Default(value) => format!("mapped to '{value}'"),
            FallbackPolicy::Marker { suffix } => {
                format!("kept with suffix '{suffix}'")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoricalLookup {
    entries: HashMap<String, String>,
}

impl CategoricalLookup {
    /// Keys are case-folded; a later pair overrides an earlier one with the same key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (case_fold(k.as_ref()), v.into()))
            .collect();
        Self { entries }
    }

    /// Keys each canonical value by its own case-folded spelling.
    pub fn from_canonical_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        Self::from_pairs(
            values
                .into_iter()
                .map(|v| (v.as_ref().to_string(), v.as_ref().to_string())),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CategoricalSpec<'a> {
    pub source_column: &'a str,
    pub output_column: &'a str,
    pub key: KeyStrategy,
    pub fallback: &'a FallbackPolicy,
    /// When set, the tokens after the first one are written to this column.
    pub qualifier_column: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingReport {
    pub column: String,
    /// Distinct raw values that fell back, in first-appearance order.
    pub unmapped: Vec<String>,
    /// Rows whose raw value was missing (always a fallback).
    pub missing: usize,
    pub policy: String,
}

impl MappingReport {
    pub fn all_mapped(&self) -> bool {
        self.unmapped.is_empty() && self.missing == 0
    }

    pub fn summary(&self) -> String {
        if self.all_mapped() {
            return format!("All values of '{}' have been mapped.", self.column);
        }
        let mut parts = Vec::new();
        if !self.unmapped.is_empty() {
            parts.push(format!(
                "{} value(s) of '{}' not found in lookup and {}: [{}]",
                self.unmapped.len(),
                self.column,
                self.policy,
                self.unmapped.iter().map(|v| format!("'{v}'")).join(", ")
            ));
        }
        if self.missing > 0 {
            parts.push(format!(
                "{} row(s) without a value for '{}'",
                self.missing, self.column
            ));
        }
        format!("CHECK! {}", parts.join("; "))
    }
}

pub fn map_categorical(
    table: Table,
    lookup: &CategoricalLookup,
    spec: &CategoricalSpec<'_>,
) -> ReconcileResult<(Table, MappingReport)> {
    let raw_values = table.column_values(spec.source_column)?;
    let mut mapped: Vec<Cell> = Vec::with_capacity(raw_values.len());
    let mut qualifiers: Vec<Cell> = Vec::with_capacity(raw_values.len());
    let mut seen = HashSet::new();
    let mut report = MappingReport {
        column: spec.source_column.to_string(),
        policy: spec.fallback.describe(),
        ..MappingReport::default()
    };

    for cell in raw_values {
        let raw = match cell {
            Some(value) => value.as_display(),
            None => {
                report.missing += 1;
                String::new()
            }
        };
        let value = match lookup.get(&spec.key.key(&raw)) {
            Some(canonical) => canonical.to_string(),
            None => {
                if cell.is_some() && seen.insert(raw.clone()) {
                    report.unmapped.push(raw.clone());
                }
                spec.fallback.apply(&raw)
            }
        };
        mapped.push(Some(Value::String(value)));
        if spec.qualifier_column.is_some() {
            qualifiers.push(qualifier(&raw));
        }
    }

    let mut table = table.with_column(spec.output_column, mapped);
    if let Some(column) = spec.qualifier_column {
        table = table.with_column(column, qualifiers);
    }
    Ok((table, report))
}

fn qualifier(raw: &str) -> Cell {
    let rest = raw.split_whitespace().skip(1).join(" ");
    (!rest.is_empty()).then(|| Value::String(rest))
}
