use std::path::PathBuf;

use thiserror::Error;

use super::model::ColumnKind;

/// Failure to turn an upload into a [`Table`](super::model::Table).
///
/// A load error is a hard stop for that dataset: nothing is partially loaded
/// and no filter state is seeded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of objects, {0}")]
    NotRecords(String),

    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("no columns found in '{0}'")]
    NoColumns(String),
}

/// Failure to encode a table for download.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable problems while seeding or evaluating filters.
///
/// None of these abort a pass: coercion failures exclude the row, empty
/// columns fall back to a degenerate range, kind mismatches leave the column
/// unfiltered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("cannot read '{value}' in column '{column}' as a date")]
    Coercion { column: String, value: String },

    #[error("column '{0}' has no non-missing values")]
    EmptyColumn(String),

    #[error("{selection} selection for column '{column}' does not fit a {kind} column")]
    KindMismatch {
        column: String,
        kind: ColumnKind,
        selection: ColumnKind,
    },
}
