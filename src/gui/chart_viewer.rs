//! Chart Viewer Widget
//! Central scrollable area showing the four dashboard panels.

use crate::charts::ChartPlotter;
use crate::dashboard::DashboardCharts;
use egui::{RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const PANEL_HEIGHT: f32 = 280.0;
const PIE_HEIGHT: f32 = 260.0;

/// Displays the most recently computed dashboard panels.
#[derive(Default)]
pub struct ChartViewer {
    charts: Option<DashboardCharts>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_charts(&mut self, charts: DashboardCharts) {
        self.charts = Some(charts);
    }

    /// Distribution pie across the top, remaining panels in a two-column grid.
    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(charts) = &self.charts else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        let [first, rest @ ..] = charts.panels();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::card(ui, |ui| {
                    ChartPlotter::draw_figure(ui, first.0, first.1, PIE_HEIGHT);
                });
                ui.add_space(CHART_SPACING);

                let column_width = (ui.available_width() - CHART_SPACING) / 2.0;
                for row in rest.chunks(2) {
                    ui.horizontal(|ui| {
                        for (id, figure) in row {
                            ui.vertical(|ui| {
                                ui.set_width(column_width);
                                Self::card(ui, |ui| {
                                    ChartPlotter::draw_figure(ui, id, figure, PANEL_HEIGHT);
                                });
                            });
                            ui.add_space(CHART_SPACING);
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, add_contents);
    }
}
