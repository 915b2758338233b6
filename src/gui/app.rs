//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::dashboard::{Dashboard, DashboardEvent};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use tracing::{error, info};

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard, dataset: String) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(dashboard.options().to_vec(), dataset),
            chart_viewer: ChartViewer::new(),
            dashboard,
        };
        if let Some(selected) = app.dashboard.default_selection().map(str::to_string) {
            app.dispatch(DashboardEvent::ProductLineSelected(selected));
        }
        app
    }

    /// Run one event through the dashboard and show the result.
    fn dispatch(&mut self, event: DashboardEvent) {
        match self.dashboard.handle(&event) {
            Ok(charts) => {
                info!("Charts updated for {}", charts.selected);
                self.control_panel.set_status(format!(
                    "Showing {} ({} rows loaded)",
                    charts.selected,
                    self.dashboard.table().row_count()
                ));
                self.chart_viewer.set_charts(charts);
            }
            Err(e) => {
                error!("Failed to recompute charts for {event:?}: {e}");
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                if let ControlPanelAction::ProductLineSelected(product_line) =
                    self.control_panel.show(ui)
                {
                    self.dispatch(DashboardEvent::ProductLineSelected(product_line));
                }
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
