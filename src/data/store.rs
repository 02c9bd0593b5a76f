use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::model::{CellValue, Column, ColumnDescriptor, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Selection: the user's current choice for one column
// ---------------------------------------------------------------------------

/// Current filter value of one column.
///
/// Range bounds are inclusive and always ordered (`low <= high`,
/// `start <= end`). An empty categorical set means "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Numeric { low: f64, high: f64 },
    Temporal { start: NaiveDate, end: NaiveDate },
    Categorical { allowed: BTreeSet<CellValue> },
}

impl Selection {
    pub fn numeric(a: f64, b: f64) -> Self {
        if b < a {
            Selection::Numeric { low: b, high: a }
        } else {
            Selection::Numeric { low: a, high: b }
        }
    }

    pub fn temporal(a: NaiveDate, b: NaiveDate) -> Self {
        Selection::Temporal {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn categorical(allowed: impl IntoIterator<Item = CellValue>) -> Self {
        Selection::Categorical {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Empty categorical set: the column is not restricted.
    pub fn unrestricted() -> Self {
        Selection::Categorical {
            allowed: BTreeSet::new(),
        }
    }

    /// Same selection with its bounds put in order.
    fn normalized(self) -> Self {
        match self {
            Selection::Numeric { low, high } => Selection::numeric(low, high),
            Selection::Temporal { start, end } => Selection::temporal(start, end),
            other => other,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Selection::Numeric { .. } => ColumnKind::Numeric,
            Selection::Temporal { .. } => ColumnKind::Temporal,
            Selection::Categorical { .. } => ColumnKind::Categorical,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterStore: session-scoped selections for one dataset
// ---------------------------------------------------------------------------

/// Per-column selections for the currently loaded dataset.
///
/// The store outlives individual pipeline passes. It is bound to one dataset
/// key; selecting another dataset means creating a new store.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterStore {
    dataset: Option<String>,
    selections: BTreeMap<String, Selection>,
    initialized: bool,
}

impl FilterStore {
    pub fn new(dataset: impl Into<String>) -> Self {
        FilterStore {
            dataset: Some(dataset.into()),
            ..Default::default()
        }
    }

    /// Key of the dataset this store belongs to.
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    pub fn get(&self, column: &str) -> Option<&Selection> {
        self.selections.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, selection: Selection) {
        self.selections.insert(column.into(), selection.normalized());
    }

    pub fn remove(&mut self, column: &str) -> Option<Selection> {
        self.selections.remove(column)
    }

    pub fn clear_all(&mut self) {
        self.selections.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Selection)> {
        self.selections.iter()
    }

    /// JSON rendering used for debug logging.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

// ---------------------------------------------------------------------------
// Initializer
// ---------------------------------------------------------------------------

/// Full-domain default for a column: observed min/max for ranges, the empty
/// set for categorical columns.
pub fn default_selection(column: &Column, kind: ColumnKind) -> Result<Selection, FilterError> {
    let empty = || FilterError::EmptyColumn(column.name.clone());
    match kind {
        ColumnKind::Numeric => {
            let (low, high) = column
                .values
                .iter()
                .filter_map(CellValue::as_f64)
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .ok_or_else(empty)?;
            Ok(Selection::numeric(low, high))
        }
        ColumnKind::Temporal => {
            let dates = column.values.iter().filter_map(CellValue::as_date);
            let start = dates.clone().min().ok_or_else(empty)?;
            let end = dates.max().ok_or_else(empty)?;
            Ok(Selection::temporal(start, end))
        }
        ColumnKind::Categorical => Ok(Selection::unrestricted()),
    }
}

/// Degenerate but valid range used when a column has nothing to measure.
fn fallback_selection(kind: ColumnKind) -> Selection {
    match kind {
        ColumnKind::Numeric => Selection::numeric(0.0, 0.0),
        ColumnKind::Temporal => {
            let epoch = NaiveDate::default();
            Selection::temporal(epoch, epoch)
        }
        ColumnKind::Categorical => Selection::unrestricted(),
    }
}

/// Seed default selections exactly once per dataset.
///
/// While the store is initialized this is a no-op, so selections the user
/// has changed survive every later pass. Columns that already hold a
/// selection are never overwritten.
pub fn initialize(store: &mut FilterStore, table: &Table, descriptors: &[ColumnDescriptor]) {
    if store.is_initialized() {
        return;
    }

    for desc in descriptors {
        if store.get(&desc.name).is_some() {
            continue;
        }
        let Some(column) = table.column(&desc.name) else {
            continue;
        };
        let selection = default_selection(column, desc.kind).unwrap_or_else(|e| {
            log::debug!("{e}; seeding a degenerate range");
            fallback_selection(desc.kind)
        });
        store.set(desc.name.clone(), selection);
    }
    store.mark_initialized();

    if log::log_enabled!(log::Level::Debug) {
        log::debug!("Seeded filter defaults: {}", store.snapshot());
    }
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// Drop every selection and the initialized flag, keeping the dataset
/// binding. The next pass seeds fresh defaults.
pub fn reset_filters(store: &mut FilterStore) {
    let dropped = store.len();
    store.clear_all();
    store.initialized = false;
    log::debug!(
        "Reset {dropped} filter selections for dataset {:?}",
        store.dataset()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::describe;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> Table {
        Table::new(vec![
            Column::new(
                "funding_usd",
                vec![
                    CellValue::Number(100.0),
                    CellValue::Number(200.0),
                    CellValue::Number(0.0),
                    CellValue::Number(400.0),
                ],
            ),
            Column::new(
                "founded_on",
                vec![
                    CellValue::Date(date(2015, 3, 1)),
                    CellValue::Null,
                    CellValue::Date(date(2012, 7, 9)),
                    CellValue::Date(date(2020, 1, 1)),
                ],
            ),
            Column::new(
                "country",
                vec![
                    CellValue::Text("US".into()),
                    CellValue::Text("DE".into()),
                    CellValue::Text("US".into()),
                    CellValue::Text("FR".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_constructors_order_bounds() {
        assert_eq!(Selection::numeric(5.0, 1.0), Selection::Numeric { low: 1.0, high: 5.0 });
        assert_eq!(
            Selection::temporal(date(2020, 1, 2), date(2020, 1, 1)),
            Selection::Temporal { start: date(2020, 1, 1), end: date(2020, 1, 2) }
        );
        let mut store = FilterStore::new("a.csv");
        store.set("x", Selection::Numeric { low: 9.0, high: 3.0 });
        assert_eq!(store.get("x"), Some(&Selection::numeric(3.0, 9.0)));
    }

    #[test]
    fn test_initialize_seeds_full_domain() {
        let table = table();
        let mut store = FilterStore::new("companies.csv");
        initialize(&mut store, &table, &describe(&table));

        assert!(store.is_initialized());
        assert_eq!(store.iter().count(), 3);
        assert_eq!(store.get("funding_usd"), Some(&Selection::numeric(0.0, 400.0)));
        assert_eq!(
            store.get("founded_on"),
            Some(&Selection::temporal(date(2012, 7, 9), date(2020, 1, 1)))
        );
        assert_eq!(store.get("country"), Some(&Selection::unrestricted()));
    }

    #[test]
    fn test_initialize_is_seed_once() {
        let table = table();
        let descriptors = describe(&table);
        let mut store = FilterStore::new("companies.csv");
        initialize(&mut store, &table, &descriptors);

        store.set("funding_usd", Selection::numeric(150.0, 400.0));
        store.remove("country");
        initialize(&mut store, &table, &descriptors);

        assert_eq!(store.get("funding_usd"), Some(&Selection::numeric(150.0, 400.0)));
        assert_eq!(store.get("country"), None);
    }

    #[test]
    fn test_initialize_keeps_preexisting_selection() {
        let table = table();
        let mut store = FilterStore::new("companies.csv");
        store.set("country", Selection::categorical([CellValue::Text("US".into())]));
        initialize(&mut store, &table, &describe(&table));
        assert_eq!(
            store.get("country"),
            Some(&Selection::categorical([CellValue::Text("US".into())]))
        );
    }

    #[test]
    fn test_empty_column_falls_back_to_degenerate_range() {
        let table = Table::new(vec![
            Column::new("amount", vec![]),
            Column::new("when", vec![]),
        ])
        .unwrap();
        let descriptors = vec![
            ColumnDescriptor { name: "amount".into(), kind: ColumnKind::Numeric },
            ColumnDescriptor { name: "when".into(), kind: ColumnKind::Temporal },
        ];
        assert_eq!(
            default_selection(table.column("amount").unwrap(), ColumnKind::Numeric),
            Err(FilterError::EmptyColumn("amount".into()))
        );

        let mut store = FilterStore::new("empty.csv");
        initialize(&mut store, &table, &descriptors);
        assert_eq!(store.get("amount"), Some(&Selection::numeric(0.0, 0.0)));
        assert!(matches!(
            store.get("when"),
            Some(Selection::Temporal { start, end }) if start == end
        ));
    }

    #[test]
    fn test_reset_clears_selections_and_keeps_binding() {
        let table = table();
        let descriptors = describe(&table);
        let mut store = FilterStore::new("companies.csv");
        initialize(&mut store, &table, &descriptors);
        let fresh = store.clone();

        store.set("funding_usd", Selection::numeric(150.0, 400.0));
        reset_filters(&mut store);
        assert!(store.is_empty());
        assert!(!store.is_initialized());
        assert_eq!(store.dataset(), Some("companies.csv"));

        initialize(&mut store, &table, &descriptors);
        assert_eq!(store, fresh);
    }

    #[test]
    fn test_reset_on_empty_store() {
        let mut store = FilterStore::default();
        reset_filters(&mut store);
        reset_filters(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_json() {
        let mut store = FilterStore::new("a.csv");
        store.set("n", Selection::numeric(1.0, 2.0));
        let snapshot = store.snapshot();
        assert!(snapshot.contains("\"kind\":\"numeric\""));
        assert!(snapshot.contains("\"a.csv\""));
    }
}
