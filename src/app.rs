use eframe::egui;
use insight_dash::config::DashboardConfig;
use insight_dash::state::AppState;

use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct InsightDashApp {
    pub state: AppState,
    pub config: DashboardConfig,
}

impl InsightDashApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::default(),
            config,
        }
    }
}

impl eframe::App for InsightDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::ingest_dropped_files(ctx, &mut self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.config);
        });

        // ---- Left side panel: dataset choice and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(self.config.side_panel_width)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview, filtered rows, download ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::data_panel(ui, &mut self.state, &self.config);
        });
    }
}
