use anyhow::{Context, Result};
use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};
use insight_dash::config::DashboardConfig;
use insight_dash::data::model::Table;
use insight_dash::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Central panel – preview, filtered rows, download
// ---------------------------------------------------------------------------

/// Render the central data panel.
pub fn data_panel(ui: &mut Ui, state: &mut AppState, config: &DashboardConfig) {
    let (Some(source), Some(view)) = (&state.source, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open CSV files to begin  (File → Open CSV files…)");
        });
        return;
    };

    ui.heading("Data Preview");
    let preview = source.head(config.preview_rows);
    ui.push_id("preview_table", |ui: &mut Ui| {
        grid(ui, &preview, false);
    });

    ui.add_space(8.0);
    ui.heading(format!("Filtered Data ({} rows)", view.row_count()));
    let download = ui.button("Download filtered data as CSV").clicked();
    ui.push_id("filtered_table", |ui: &mut Ui| {
        grid(ui, view, true);
    });

    if download {
        if let Err(e) = save_export(state) {
            log::error!("Download failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Render a table with a header row. `scroll` lets it fill the remaining
/// height with a vertical scrollbar.
fn grid(ui: &mut Ui, table: &Table, scroll: bool) {
    let columns = table.columns();
    if columns.is_empty() {
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(scroll)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(TableColumn::auto().at_least(80.0), columns.len())
        .header(20.0, |mut header| {
            for col in columns {
                header.col(|ui| {
                    ui.strong(&col.name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.row_count(), |mut row| {
                let i = row.index();
                for col in columns {
                    row.col(|ui| {
                        ui.label(col.values[i].to_string());
                    });
                }
            });
        });
}

fn save_export(state: &AppState) -> Result<()> {
    let Some(artifact) = state.export_view().context("encoding filtered data")? else {
        return Ok(());
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(&artifact.file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(());
    };

    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Saved {} ({}, {} bytes) to {}",
        artifact.file_name,
        artifact.content_type,
        artifact.bytes.len(),
        path.display()
    );
    Ok(())
}
