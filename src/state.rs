use std::collections::BTreeSet;

use crate::data::classify::describe;
use crate::data::error::ExportError;
use crate::data::export::{export, ExportArtifact};
use crate::data::filter::apply;
use crate::data::loader::load_bytes;
use crate::data::model::{CellValue, ColumnDescriptor, Table};
use crate::data::store::{self, default_selection, initialize, FilterStore, Selection};

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// One uploaded file, kept as raw bytes until it is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Decode result of the selected upload, cached until another upload is
/// selected or the same name is uploaded again.
#[derive(Debug, Clone)]
struct Decoded {
    name: String,
    result: Result<Table, String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Uploaded files, in upload order.
    pub uploads: Vec<Upload>,

    /// Name of the upload being analysed.
    pub selected: Option<String>,

    /// Table as decoded, gaps still missing; shown as the data preview.
    pub source: Option<Table>,

    /// Loaded table with numeric gaps zero-filled (None if absent or failed).
    pub table: Option<Table>,

    /// Column kinds of `table`, recomputed on every pass.
    pub descriptors: Vec<ColumnDescriptor>,

    /// Per-column filter selections for the selected dataset.
    pub filters: FilterStore,

    /// Rows of `table` passing the current filters.
    pub view: Option<Table>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    decoded: Option<Decoded>,
}

impl AppState {
    /// Add uploaded files. Re-uploading a name replaces the earlier bytes and
    /// counts as a new dataset. The first upload becomes the selection.
    pub fn add_uploads(&mut self, uploads: Vec<Upload>) {
        for upload in uploads {
            if self.selected.as_deref() == Some(upload.name.as_str()) {
                self.decoded = None;
                self.filters = FilterStore::new(upload.name.clone());
            }
            match self.uploads.iter_mut().find(|u| u.name == upload.name) {
                Some(existing) => *existing = upload,
                None => self.uploads.push(upload),
            }
        }
        if self.selected.is_none() {
            if let Some(first) = self.uploads.first() {
                let name = first.name.clone();
                self.select_upload(&name);
                return;
            }
        }
        self.run_pass();
    }

    /// Switch the analysed dataset. A different dataset gets a fresh store.
    pub fn select_upload(&mut self, name: &str) {
        if self.selected.as_deref() != Some(name) {
            log::info!("Selected dataset '{name}'");
            self.selected = Some(name.to_string());
            self.filters = FilterStore::new(name);
        }
        self.run_pass();
    }

    /// One full pipeline pass: load → classify → zero-fill → seed → evaluate.
    ///
    /// The results replace the previous ones only once the pass is complete.
    pub fn run_pass(&mut self) {
        let Some(name) = self.selected.clone() else {
            self.clear_dataset();
            return;
        };

        if self.filters.dataset() != Some(name.as_str()) {
            self.filters = FilterStore::new(name.clone());
        }

        let raw = match self.decode(&name) {
            Ok(raw) => raw,
            Err(message) => {
                self.clear_dataset();
                self.status_message = Some(message);
                return;
            }
        };

        let descriptors = describe(&raw);
        let table = raw.fill_numeric_nulls(&descriptors);
        initialize(&mut self.filters, &table, &descriptors);
        let view = apply(&table, &descriptors, &self.filters);

        log::debug!(
            "Pass over '{name}': {} of {} rows visible",
            view.row_count(),
            table.row_count()
        );

        self.source = Some(raw);
        self.table = Some(table);
        self.descriptors = descriptors;
        self.view = Some(view);
        self.status_message = None;
    }

    /// Decode the named upload, reusing the cached result when possible.
    fn decode(&mut self, name: &str) -> Result<Table, String> {
        if let Some(decoded) = self.decoded.as_ref().filter(|d| d.name == name) {
            return decoded.result.clone();
        }

        let result = match self.uploads.iter().find(|u| u.name == name) {
            Some(upload) => load_bytes(&upload.name, &upload.bytes)
                .inspect(|table| {
                    log::info!(
                        "Loaded '{name}': {} rows, columns {:?}",
                        table.row_count(),
                        table.column_names()
                    )
                })
                .map_err(|e| {
                    log::error!("Failed to load '{name}': {e}");
                    format!("Error reading file: {e}")
                }),
            None => Err(format!("No upload named '{name}'")),
        };

        self.decoded = Some(Decoded {
            name: name.to_string(),
            result: result.clone(),
        });
        result
    }

    fn clear_dataset(&mut self) {
        self.source = None;
        self.table = None;
        self.descriptors.clear();
        self.view = None;
    }

    /// Record the user's new value for a column and re-run the pipeline.
    pub fn set_selection(&mut self, column: &str, selection: Selection) {
        self.filters.set(column, selection);
        self.run_pass();
    }

    /// "Clear Filters": drop all selections and re-seed on the next pass.
    pub fn reset_filters(&mut self) {
        store::reset_filters(&mut self.filters);
        self.run_pass();
    }

    /// Full domain of a column (observed min/max or the empty set), used to
    /// bound the filter controls.
    pub fn domain(&self, column: &str) -> Option<Selection> {
        let desc = self.descriptors.iter().find(|d| d.name == column)?;
        let col = self.table.as_ref()?.column(column)?;
        default_selection(col, desc.kind).ok()
    }

    /// Distinct non-missing values of a column; the multi-select options.
    pub fn options(&self, column: &str) -> BTreeSet<CellValue> {
        self.table
            .as_ref()
            .and_then(|t| t.column(column))
            .map(|c| c.unique_values())
            .unwrap_or_default()
    }

    /// Encode the current filtered view for download.
    pub fn export_view(&self) -> Result<Option<ExportArtifact>, ExportError> {
        self.view.as_ref().map(export).transpose()
    }
}
