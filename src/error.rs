//! Domain errors raised by the reshaping, mapping and reconciliation stages.
//!
//! Loaders and the orchestrator wrap these in `anyhow` with path/stage context;
//! the variants themselves carry enough detail to locate the offending cell or
//! mapping entry.

use thiserror::Error;

use crate::reconcile::CoercionTarget;

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("Column '{column}' not found in table")]
    UnknownColumn { column: String },

    #[error("Row {row} has no value for identity column '{column}'")]
    IncompleteIdentity { row: usize, column: String },

    #[error("Duplicate column '{column}' in table")]
    DuplicateColumn { column: String },

    #[error(
        "Reconciled table has {actual} column(s) but the target defines {expected}; \
         the correspondence mapping is inconsistent with the two schemas"
    )]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error(
        "Reconciled columns do not match the target \
         (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    ColumnSetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error(
        "Row {row} column '{column}': cannot coerce {} to {target}",
        describe_raw(.value)
    )]
    Coercion {
        column: String,
        row: usize,
        value: Option<String>,
        target: CoercionTarget,
    },
}

fn describe_raw(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{v}'"),
        None => "a missing value".to_string(),
    }
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
