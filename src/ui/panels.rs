use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;
use insight_dash::config::DashboardConfig;
use insight_dash::data::model::{ColumnDescriptor, ColumnKind};
use insight_dash::data::store::Selection;
use insight_dash::state::{AppState, Upload};

// ---------------------------------------------------------------------------
// Left side panel – dataset choice and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.uploads.is_empty() {
        ui.heading("Filters");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Dataset selector ----
    ui.strong("Select a CSV file to analyze");
    let current = state.selected.clone().unwrap_or_default();
    let names: Vec<String> = state.uploads.iter().map(|u| u.name.clone()).collect();
    egui::ComboBox::from_id_salt("dataset_select")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for name in &names {
                if ui.selectable_label(current == *name, name).clicked() {
                    state.select_upload(name);
                }
            }
        });

    ui.add_space(4.0);
    ui.heading("Filters");

    if ui.button("Clear Filters").clicked() {
        state.reset_filters();
    }
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let descriptors = state.descriptors.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for desc in &descriptors {
                let new_selection = match desc.kind {
                    ColumnKind::Numeric => numeric_filter(ui, state, desc),
                    ColumnKind::Temporal => temporal_filter(ui, state, desc),
                    ColumnKind::Categorical => categorical_filter(ui, state, desc),
                };
                if let Some(selection) = new_selection {
                    state.set_selection(&desc.name, selection);
                }
                ui.add_space(6.0);
            }
        });
}

/// Current selection of a column, or its full domain when nothing is stored.
fn current_or_domain(state: &AppState, column: &str) -> Option<Selection> {
    state
        .filters
        .get(column)
        .cloned()
        .or_else(|| state.domain(column))
}

/// Min/max sliders bounded by the observed range.
fn numeric_filter(ui: &mut Ui, state: &AppState, desc: &ColumnDescriptor) -> Option<Selection> {
    let Some(Selection::Numeric { low: min, high: max }) = state.domain(&desc.name) else {
        return None;
    };
    let (mut low, mut high) = match current_or_domain(state, &desc.name) {
        Some(Selection::Numeric { low, high }) => (low, high),
        _ => (min, max),
    };

    ui.label(format!("Select range for {}", desc.name));
    let mut changed = false;
    changed |= ui
        .add(egui::Slider::new(&mut low, min..=max).text("min"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut high, min..=max).text("max"))
        .changed();

    changed.then(|| Selection::numeric(low, high))
}

/// Start/end date pickers.
fn temporal_filter(ui: &mut Ui, state: &AppState, desc: &ColumnDescriptor) -> Option<Selection> {
    let Some(Selection::Temporal { mut start, mut end }) = current_or_domain(state, &desc.name)
    else {
        return None;
    };

    ui.label(format!("Select date range for {}", desc.name));
    let start_id = format!("{}_start", desc.name);
    let end_id = format!("{}_end", desc.name);
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt(&start_id))
            .changed();
        ui.label("to");
        changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt(&end_id))
            .changed();
    });

    changed.then(|| Selection::temporal(start, end))
}

/// Checkbox multi-select over the column's distinct values.
/// Nothing ticked means no restriction.
fn categorical_filter(
    ui: &mut Ui,
    state: &AppState,
    desc: &ColumnDescriptor,
) -> Option<Selection> {
    let mut allowed = match current_or_domain(state, &desc.name) {
        Some(Selection::Categorical { allowed }) => allowed,
        _ => Default::default(),
    };
    let options = state.options(&desc.name);

    let header_text = if allowed.is_empty() {
        format!("Select {}  (all {})", desc.name, options.len())
    } else {
        format!("Select {}  ({}/{})", desc.name, allowed.len(), options.len())
    };

    let mut changed = false;
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(&desc.name)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("None").clicked() && !allowed.is_empty() {
                allowed.clear();
                changed = true;
            }
            for val in &options {
                let mut checked = allowed.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        allowed.insert(val.clone());
                    } else {
                        allowed.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed.then(|| Selection::categorical(allowed))
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, config: &DashboardConfig) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV files…").clicked() {
                open_files_dialog(state, config);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong(&config.title);
        ui.separator();

        if let (Some(table), Some(view)) = (&state.table, &state.view) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                table.row_count(),
                view.row_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState, config: &DashboardConfig) {
    let Some(paths) = rfd::FileDialog::new()
        .set_title("Choose CSV files")
        .add_filter("Supported files", config.upload_extensions.as_slice())
        .add_filter("CSV", &["csv"])
        .pick_files()
    else {
        return;
    };

    let results = paths.iter().map(|p| read_upload(p)).collect();
    accept_uploads(state, results);
}

/// Accept files dropped onto the window as uploads.
pub fn ingest_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    if dropped.is_empty() {
        return;
    }

    let results = dropped
        .into_iter()
        .filter_map(|file| match (file.bytes, file.path) {
            (Some(bytes), _) => Some(Ok(Upload::new(file.name, bytes.to_vec()))),
            (None, Some(path)) => Some(read_upload(&path)),
            (None, None) => None,
        })
        .collect();
    accept_uploads(state, results);
}

/// Hand readable files to the state; report the first unreadable one.
fn accept_uploads(state: &mut AppState, results: Vec<Result<Upload>>) {
    let mut uploads = Vec::with_capacity(results.len());
    let mut failure = None;
    for result in results {
        match result {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                log::error!("Failed to read upload: {e:#}");
                failure.get_or_insert(format!("Error: {e:#}"));
            }
        }
    }
    if !uploads.is_empty() {
        state.add_uploads(uploads);
    }
    if failure.is_some() {
        state.status_message = failure;
    }
}

fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("upload has no file name")?
        .to_string();
    log::info!("Uploaded '{name}' ({} bytes)", bytes.len());
    Ok(Upload::new(name, bytes))
}
