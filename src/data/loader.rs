use std::collections::HashSet;
use std::path::Path;

use serde_json::Value as JsonValue;

use super::classify::parse_date;
use super::error::LoadError;
use super::model::{CellValue, Column, Table};

/// Cell texts read as missing values (compared case-insensitively).
/// Same spellings pandas treats as missing by default.
pub const NULL_TOKENS: &[&str] = &[
    "", "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan",
    "<na>", "n/a", "na", "nan", "null", "none",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file on disk.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_bytes(name, &bytes)
}

/// Decode an uploaded byte stream.  The upload's file name picks the format:
///
/// * `.json` – records, `[{ "company": "Acme", "funding_usd": 100 }, ...]`
/// * `.tsv`  – tab-separated with a header row
/// * anything else – comma-separated with a header row
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Table, LoadError> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "json" => load_json(bytes)?,
        "tsv" | "tab" => load_delimited(bytes, b'\t')?,
        _ => load_delimited(bytes, b',')?,
    };

    if table.columns().is_empty() {
        return Err(LoadError::NoColumns(name.to_string()));
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

fn load_delimited(bytes: &[u8], delimiter: u8) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers = dedupe_headers(reader.headers()?.iter().map(|h| h.trim().to_string()));

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    // The csv reader rejects rows whose field count differs from the header.
    for result in reader.records() {
        let record = result?;
        for (col_idx, field) in record.iter().enumerate() {
            values[col_idx].push(guess_cell_type(field));
        }
    }

    Table::new(
        headers
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

/// Rename repeated header names to `name.1`, `name.2`, ... skipping any
/// suffix already taken by another header.
fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let headers: Vec<String> = headers.collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for name in &headers {
        let mut candidate = name.clone();
        let mut n = 0;
        while taken.contains(&candidate)
            || (n > 0 && headers.iter().any(|h| *h == candidate))
        {
            n += 1;
            candidate = format!("{name}.{n}");
        }
        if candidate != *name {
            log::warn!("Duplicate column '{name}' renamed to '{candidate}'");
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Type a raw text cell: missing, number, date, or free text.
pub fn guess_cell_type(s: &str) -> CellValue {
    let trimmed = s.trim();
    if is_null_token(trimmed) {
        return CellValue::Null;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        // "+nan" and friends parse as NaN; they are gaps, not numbers.
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Number(f);
    }
    if let Some(d) = parse_date(trimmed) {
        return CellValue::Date(d);
    }
    CellValue::Text(s.to_string())
}

pub fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(s))
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

fn load_json(bytes: &[u8]) -> Result<Table, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::NotRecords("top level is not an array".into()))?;

    // Column order is first appearance across records.
    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::NotRecords(format!("row {i} is not an object")))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| json_to_cell(rec.get(&name).unwrap_or(&JsonValue::Null)))
                .collect();
            Column::new(name, values)
        })
        .collect();

    Table::new(columns)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Null => CellValue::Null,
        JsonValue::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_load_csv_types_cells() {
        let data = b"name,funding_usd,founded_on\nAcme,100,2019-05-01\nGlobex,,2020-01-15\n";
        let table = load_bytes("companies.csv", data).unwrap();

        assert_eq!(table.column_names(), vec!["name", "funding_usd", "founded_on"]);
        assert_eq!(table.row_count(), 2);
        let funding = &table.column("funding_usd").unwrap().values;
        assert_eq!(funding, &vec![CellValue::Number(100.0), CellValue::Null]);
        assert_eq!(
            table.column("founded_on").unwrap().values[1],
            CellValue::Date(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_load_tsv() {
        let data = b"a\tb\n1\tx\n";
        let table = load_bytes("data.TSV", data).unwrap();
        assert_eq!(table.column("b").unwrap().values[0], CellValue::Text("x".into()));
    }

    #[test]
    fn test_ragged_csv_is_an_error() {
        let data = b"a,b\n1,2\n3\n";
        assert!(matches!(load_bytes("x.csv", data), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_empty_upload_has_no_columns() {
        assert!(matches!(load_bytes("x.csv", b""), Err(LoadError::NoColumns(_))));
    }

    #[test]
    fn test_header_only_csv_loads_empty_table() {
        let table = load_bytes("x.csv", b"a,b\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_load_json_records() {
        let data = br#"[{"company":"Acme","funding_usd":100},{"funding_usd":null,"country":"DE"}]"#;
        let table = load_bytes("rounds.json", data).unwrap();
        assert_eq!(table.column_names(), vec!["company", "funding_usd", "country"]);
        assert_eq!(table.column("company").unwrap().values[1], CellValue::Null);
        assert_eq!(table.column("country").unwrap().values[1], CellValue::Text("DE".into()));
    }

    #[test]
    fn test_json_must_be_records() {
        assert!(matches!(load_bytes("x.json", b"{\"a\":1}"), Err(LoadError::NotRecords(_))));
        assert!(matches!(load_bytes("x.json", b"[1,2]"), Err(LoadError::NotRecords(_))));
        assert!(matches!(load_bytes("x.json", b"not json"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_null_tokens() {
        assert!(is_null_token(""));
        assert!(is_null_token("NA"));
        assert!(is_null_token("n/a"));
        assert!(is_null_token("NaN"));
        assert!(is_null_token("NULL"));
        assert!(is_null_token("#N/A"));
        assert!(is_null_token("#N/A N/A"));
        assert!(is_null_token("<NA>"));
        assert!(is_null_token("-1.#IND"));
        assert!(is_null_token("1.#QNAN"));
        assert!(!is_null_token("0"));
        assert!(!is_null_token("value"));
    }

    #[test]
    fn test_nan_spellings_are_missing() {
        for token in ["-nan", "+nan", "-NaN", "+NAN"] {
            assert_eq!(guess_cell_type(token), CellValue::Null, "{token}");
        }
        assert_eq!(guess_cell_type("inf"), CellValue::Number(f64::INFINITY));
    }

    #[test]
    fn test_excel_missing_markers_keep_column_numeric() {
        let data = b"funding_usd\n100\n#N/A\n400\n-nan\n";
        let table = load_bytes("x.csv", data).unwrap();
        let column = table.column("funding_usd").unwrap();
        assert_eq!(
            column.values,
            vec![
                CellValue::Number(100.0),
                CellValue::Null,
                CellValue::Number(400.0),
                CellValue::Null,
            ]
        );
        assert_eq!(crate::data::classify::classify(column), crate::data::model::ColumnKind::Numeric);
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let table = load_bytes("x.csv", b"a,b,a,a.1,a\n1,2,3,4,5\n").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "a.2", "a.1", "a.3"]);
        assert_eq!(table.column("a.2").unwrap().values, vec![CellValue::Number(3.0)]);
    }

    #[test]
    fn test_load_file_reports_missing_path() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
