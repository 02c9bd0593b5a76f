use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::classify::parse_date;
use super::error::FilterError;
use super::model::{CellValue, ColumnDescriptor, ColumnKind, Table};
use super::store::{FilterStore, Selection};

// ---------------------------------------------------------------------------
// Column predicates
// ---------------------------------------------------------------------------

/// Row-inclusion test for the cells of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPredicate {
    /// No restriction (empty categorical selection).
    AcceptAll,
    Range { low: f64, high: f64 },
    DateRange { start: NaiveDate, end: NaiveDate },
    OneOf(BTreeSet<CellValue>),
}

/// Build the predicate for a column of `kind` from its current selection.
///
/// Returns a `KindMismatch` error when the selection's tag does not fit the
/// column, e.g. a stale selection from before the column was reclassified.
pub fn build_predicate(
    column: &str,
    kind: ColumnKind,
    selection: &Selection,
) -> Result<ColumnPredicate, FilterError> {
    match (kind, selection) {
        (ColumnKind::Numeric, Selection::Numeric { low, high }) => Ok(ColumnPredicate::Range {
            low: *low,
            high: *high,
        }),
        (ColumnKind::Temporal, Selection::Temporal { start, end }) => {
            Ok(ColumnPredicate::DateRange {
                start: *start,
                end: *end,
            })
        }
        (ColumnKind::Categorical, Selection::Categorical { allowed }) if allowed.is_empty() => {
            Ok(ColumnPredicate::AcceptAll)
        }
        (ColumnKind::Categorical, Selection::Categorical { allowed }) => {
            Ok(ColumnPredicate::OneOf(allowed.clone()))
        }
        _ => Err(FilterError::KindMismatch {
            column: column.to_string(),
            kind,
            selection: selection.kind(),
        }),
    }
}

impl ColumnPredicate {
    /// Whether a row whose cell in this column is `value` survives.
    /// `column` only names the column in coercion diagnostics.
    pub fn test(&self, column: &str, value: &CellValue) -> bool {
        match self {
            ColumnPredicate::AcceptAll => true,
            ColumnPredicate::Range { low, high } => value
                .as_f64()
                .is_some_and(|v| *low <= v && v <= *high),
            ColumnPredicate::DateRange { start, end } => match coerce_date(column, value) {
                Ok(d) => *start <= d && d <= *end,
                Err(e) => {
                    log::trace!("Excluding row: {e}");
                    false
                }
            },
            ColumnPredicate::OneOf(allowed) => allowed.contains(value),
        }
    }
}

fn coerce_date(column: &str, value: &CellValue) -> Result<NaiveDate, FilterError> {
    match value {
        CellValue::Date(d) => Ok(*d),
        CellValue::Text(s) => parse_date(s).ok_or_else(|| FilterError::Coercion {
            column: column.to_string(),
            value: s.clone(),
        }),
        other => Err(FilterError::Coercion {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Return indices of rows that pass every column's predicate.
///
/// Only columns present in both the table and the store are constrained. A
/// column whose selection does not fit its kind is left unfiltered.
pub fn filtered_indices(
    table: &Table,
    descriptors: &[ColumnDescriptor],
    store: &FilterStore,
) -> Vec<usize> {
    let active: Vec<(&[CellValue], &str, ColumnPredicate)> = descriptors
        .iter()
        .filter_map(|desc| {
            let column = table.column(&desc.name)?;
            let selection = store.get(&desc.name)?;
            match build_predicate(&desc.name, desc.kind, selection) {
                Ok(ColumnPredicate::AcceptAll) => None,
                Ok(predicate) => Some((column.values.as_slice(), desc.name.as_str(), predicate)),
                Err(e) => {
                    log::warn!("{e}; column left unfiltered");
                    None
                }
            }
        })
        .collect();

    (0..table.row_count())
        .filter(|&row| {
            active
                .iter()
                .all(|(values, name, predicate)| predicate.test(name, &values[row]))
        })
        .collect()
}

/// Produce the filtered view as a new table. Column order and the relative
/// order of surviving rows are kept.
pub fn apply(table: &Table, descriptors: &[ColumnDescriptor], store: &FilterStore) -> Table {
    table.take_rows(&filtered_indices(table, descriptors, store))
}
