//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::DashboardApp;
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};

use crate::dashboard::Dashboard;
use eframe::egui;

/// Open the dashboard window and block until it is closed.
pub fn run(dashboard: Dashboard, dataset: String) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Product Sales Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Product Sales Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dashboard, dataset)))),
    )
}
