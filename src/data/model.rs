use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LoadError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, assigned once by the loader.
/// Used in `BTreeSet`s (categorical selections), so `CellValue` must be `Ord`.
/// Equality, ordering and hashing agree; `0.0` and `-0.0` are the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Null,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Date(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) if a == b => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            // -0.0 hashes like 0.0 since they compare equal.
            CellValue::Number(f) => (f + 0.0).to_bits().hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Renders the cell the way it is written to CSV: `Null` is the empty string,
/// whole numbers carry no fractional part, dates are ISO-8601.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

/// Which filter control and predicate a column gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Temporal,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Temporal => write!(f, "temporal"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Name and classified kind of one column, computed per pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Sorted distinct non-null values; the options of a multi-select.
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_null())
    }
}

/// An immutable, column-ordered table. All columns have the same length.
///
/// Filtering never mutates a table; derived views are produced with
/// [`Table::take_rows`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, rejecting ragged columns and repeated column names.
    pub fn new(columns: Vec<Column>) -> Result<Self, LoadError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(LoadError::DuplicateColumn(col.name.clone()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(LoadError::RaggedColumn {
                    column: bad.name.clone(),
                    expected,
                    found: bad.values.len(),
                });
            }
        }
        Ok(Table { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Copy the given rows (in the given order) into a new table.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..self.row_count().min(n)).collect();
        self.take_rows(&indices)
    }

    /// Copy of the table with `Null` replaced by `0.0` in every numeric column.
    pub fn fill_numeric_nulls(&self, descriptors: &[ColumnDescriptor]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let numeric = descriptors
                    .iter()
                    .any(|d| d.name == c.name && d.kind == ColumnKind::Numeric);
                if !numeric {
                    return c.clone();
                }
                let values = c
                    .values
                    .iter()
                    .map(|v| match v {
                        CellValue::Null => CellValue::Number(0.0),
                        other => other.clone(),
                    })
                    .collect();
                Column {
                    name: c.name.clone(),
                    values,
                }
            })
            .collect();
        Table { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "funding_usd",
                vec![
                    CellValue::Number(100.0),
                    CellValue::Null,
                    CellValue::Number(400.0),
                ],
            ),
            Column::new(
                "country",
                vec![
                    CellValue::Text("US".into()),
                    CellValue::Null,
                    CellValue::Text("DE".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let err = Table::new(vec![
            Column::new("a", vec![CellValue::Null]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::RaggedColumn { expected: 1, found: 0, .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new(vec![Column::new("a", vec![]), Column::new("a", vec![])])
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_take_rows_copies_in_order() {
        let table = sample();
        let view = table.take_rows(&[2, 0]);
        assert_eq!(view.row_count(), 2);
        assert_eq!(view.column("country").unwrap().values[0], CellValue::Text("DE".into()));
        // Source untouched.
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_fill_numeric_nulls_only_touches_numeric_columns() {
        let table = sample();
        let descriptors = vec![
            ColumnDescriptor { name: "funding_usd".into(), kind: ColumnKind::Numeric },
            ColumnDescriptor { name: "country".into(), kind: ColumnKind::Categorical },
        ];
        let filled = table.fill_numeric_nulls(&descriptors);
        assert_eq!(filled.column("funding_usd").unwrap().values[1], CellValue::Number(0.0));
        assert_eq!(filled.column("country").unwrap().values[1], CellValue::Null);
        assert_eq!(table.column("funding_usd").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn test_unique_values_skip_null() {
        let table = sample();
        let unique = table.column("country").unwrap().unique_values();
        assert_eq!(unique.len(), 2);
        assert!(!unique.contains(&CellValue::Null));
    }

    #[test]
    fn test_display_matches_csv_rendering() {
        assert_eq!(CellValue::Number(200.0).to_string(), "200");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Null.to_string(), "");
        let d = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(CellValue::Date(d).to_string(), "2021-03-04");
    }

    #[test]
    fn test_signed_zero_is_one_value() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let pos = CellValue::Number(0.0);
        let neg = CellValue::Number(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(pos.cmp(&neg), std::cmp::Ordering::Equal);

        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&pos), hash(&neg));

        let column = Column::new("n", vec![pos.clone(), neg.clone(), CellValue::Number(1.0)]);
        assert_eq!(column.unique_values().len(), 2);
        let allowed: BTreeSet<CellValue> = [pos].into_iter().collect();
        assert!(allowed.contains(&neg));
    }

    #[test]
    fn test_ordering_groups_by_variant() {
        let mut set = BTreeSet::new();
        set.insert(CellValue::Text("a".into()));
        set.insert(CellValue::Number(2.0));
        set.insert(CellValue::Null);
        set.insert(CellValue::Number(-1.0));
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered[0], CellValue::Null);
        assert_eq!(ordered[1], CellValue::Number(-1.0));
        assert_eq!(ordered[3], CellValue::Text("a".into()));
    }
}
