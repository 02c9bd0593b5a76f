use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Column, ColumnDescriptor, ColumnKind, Table};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

// ---------------------------------------------------------------------------
// Type classifier
// ---------------------------------------------------------------------------

/// Assign a filter kind to a column.
///
/// Numeric wins when every non-null cell is a number (an all-null column
/// counts as numeric, it is zero-filled later). Temporal when every non-null
/// cell is a date. Everything else, including mixed columns, is categorical.
pub fn classify(column: &Column) -> ColumnKind {
    if column
        .non_null()
        .all(|v| matches!(v, CellValue::Number(_)))
    {
        ColumnKind::Numeric
    } else if column.non_null().all(|v| matches!(v, CellValue::Date(_))) {
        ColumnKind::Temporal
    } else {
        ColumnKind::Categorical
    }
}

/// Classify every column of the table, in column order.
pub fn describe(table: &Table) -> Vec<ColumnDescriptor> {
    table
        .columns()
        .iter()
        .map(|c| ColumnDescriptor {
            name: c.name.clone(),
            kind: classify(c),
        })
        .collect()
}

/// Parse a calendar date from the textual forms commonly found in CSV exports.
/// Date-times keep only their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
