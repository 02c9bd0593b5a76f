use super::error::ExportError;
use super::model::Table;

pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Encoded table ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Encode a table as comma-separated UTF-8 with a header row.
/// Missing cells become empty fields.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for i in 0..table.row_count() {
        writer.write_record(table.row(i).iter().map(|v| v.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

pub fn export(table: &Table) -> Result<ExportArtifact, ExportError> {
    let bytes = to_csv_bytes(table)?;
    log::info!(
        "Exported {} rows x {} columns ({} bytes)",
        table.row_count(),
        table.columns().len(),
        bytes.len()
    );
    Ok(ExportArtifact {
        bytes,
        file_name: EXPORT_FILE_NAME.to_string(),
        content_type: EXPORT_CONTENT_TYPE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;
    use crate::data::model::{CellValue, Column};

    #[test]
    fn test_csv_layout() {
        let table = Table::new(vec![
            Column::new("company", vec![CellValue::Text("Acme, Inc".into()), CellValue::Null]),
            Column::new("funding_usd", vec![CellValue::Number(1500.0), CellValue::Number(2.25)]),
        ])
        .unwrap();
        let text = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(text, "company,funding_usd\n\"Acme, Inc\",1500\n,2.25\n");
    }

    #[test]
    fn test_artifact_metadata() {
        let table = load_bytes("a.csv", b"a\n1\n").unwrap();
        let artifact = export(&table).unwrap();
        assert_eq!(artifact.file_name, "filtered_data.csv");
        assert_eq!(artifact.content_type, "text/csv");
        assert_eq!(artifact.bytes, b"a\n1\n");
    }

    #[test]
    fn test_export_reloads_identically() {
        let source = b"name,funding_usd,founded_on\nAcme,100.5,2019-05-01\nGlobex,,\n";
        let table = load_bytes("in.csv", source).unwrap();
        let artifact = export(&table).unwrap();
        let reloaded = load_bytes(&artifact.file_name, &artifact.bytes).unwrap();
        assert_eq!(reloaded, table);
    }
}
