//! Settings panel rendering for service endpoints and version info.

use super::UiApp;
use covidx_core::{HttpPredictionClient, ServiceConfig};
use eframe::egui;

impl UiApp {
    /// Renders the settings screen including endpoints and request timeout.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        egui::Grid::new("endpoint-settings")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Detection endpoint");
                ui.add(
                    egui::TextEdit::singleline(&mut self.pending_config.detection_url)
                        .desired_width(360.0),
                );
                ui.end_row();

                ui.label("Prediction endpoint");
                ui.add(
                    egui::TextEdit::singleline(&mut self.pending_config.prediction_url)
                        .desired_width(360.0),
                );
                ui.end_row();

                ui.label("Request timeout");
                ui.add(
                    egui::DragValue::new(&mut self.pending_config.timeout_secs)
                        .range(1..=300)
                        .speed(1)
                        .suffix(" s"),
                );
                ui.end_row();
            });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let changed = self.pending_config != self.config;
            if ui.add_enabled(changed, egui::Button::new("Apply")).clicked() {
                self.apply_pending_config();
            }
            if ui.button("Restore defaults").clicked() {
                self.pending_config = ServiceConfig::default();
            }
        });
        ui.label(
            "Changes apply to the next submission. Requests already in progress keep their endpoint.",
        );

        if let Err(e) = &self.client {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, e.to_string());
        }

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.heading("Versions");
        ui.label(format!("App version: {}", self.app_version));
    }

    fn apply_pending_config(&mut self) {
        let cfg = ServiceConfig {
            detection_url: self.pending_config.detection_url.trim().to_string(),
            prediction_url: self.pending_config.prediction_url.trim().to_string(),
            timeout_secs: self.pending_config.timeout_secs,
        };
        self.client = HttpPredictionClient::new(&cfg);
        self.status = match &self.client {
            Ok(_) => {
                tracing::info!(
                    "endpoints updated: detection {}, prediction {}",
                    cfg.detection_url,
                    cfg.prediction_url
                );
                "Settings applied.".to_string()
            }
            Err(e) => format!("Settings not applied: {e}"),
        };
        self.pending_config = cfg.clone();
        self.config = cfg;
    }
}
