/// Window and presentation settings for the dashboard.
///
/// There is no config file; log verbosity comes from `RUST_LOG`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Rows shown in the "Data Preview" table.
    pub preview_rows: usize,
    pub side_panel_width: f32,
    /// File extensions offered by the open dialog.
    pub upload_extensions: Vec<&'static str>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Crunchbase Insight Dashboard".to_string(),
            window_size: [1200.0, 800.0],
            min_window_size: [600.0, 400.0],
            preview_rows: 5,
            side_panel_width: 260.0,
            upload_extensions: vec!["csv", "tsv", "json"],
        }
    }
}
