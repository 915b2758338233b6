//! Control Panel Widget
//! Left side panel with the product-line dropdown and status line.

use egui::{Color32, ComboBox, RichText};

/// Left side control panel.
pub struct ControlPanel {
    pub options: Vec<String>,
    pub selected: String,
    pub dataset: String,
    pub status: String,
}

impl ControlPanel {
    pub fn new(options: Vec<String>, dataset: String) -> Self {
        let selected = options.first().cloned().unwrap_or_default();
        let status = if options.is_empty() {
            "No product lines in dataset".to_string()
        } else {
            "Ready".to_string()
        };
        Self {
            options,
            selected,
            dataset,
            status,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Product Sales Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new(&self.dataset).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Product Line Section =====
        ui.label(RichText::new("Select Product Line:").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("product-dropdown")
            .width(ui.available_width() - 10.0)
            .selected_text(&self.selected)
            .show_ui(ui, |ui| {
                for option in &self.options {
                    if ui
                        .selectable_label(self.selected == *option, option)
                        .clicked()
                        && self.selected != *option
                    {
                        self.selected = option.clone();
                        action = ControlPanelAction::ProductLineSelected(option.clone());
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ProductLineSelected(String),
}
