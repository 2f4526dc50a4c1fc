//! Questionnaire panel.

use super::{UiApp, error_frame, spawn_job};
use covidx_core::{Answer, PredictionService, RadioId};
use eframe::egui;

/// Renders one yes/no question bound to `answer`. Returns the newly picked answer, if any.
pub(super) fn question_widget(
    ui: &mut egui::Ui,
    id: RadioId,
    text: &str,
    answer: Option<Answer>,
) -> Option<Answer> {
    let mut selected = answer;
    ui.push_id(id, |ui| {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(text).strong());
            ui.horizontal(|ui| {
                ui.radio_value(&mut selected, Some(Answer::Yes), Answer::Yes.label());
                ui.radio_value(&mut selected, Some(Answer::No), Answer::No.label());
            });
        });
    });
    if selected != answer { selected } else { None }
}

impl UiApp {
    pub(super) fn render_prediction_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading("COVID Risk Questionnaire");
                let pagination = self.questionnaire.pagination();
                ui.weak(format!(
                    "Page {} of {} · {} of {} answered",
                    pagination.page() + 1,
                    pagination.page_count(),
                    self.questionnaire.answers().answered(),
                    self.questionnaire.questions().len()
                ));
                ui.add_space(8.0);

                let mut changes = Vec::new();
                for (id, question, answer) in self.questionnaire.visible_questions() {
                    if let Some(picked) = question_widget(ui, id, &question.text, answer) {
                        changes.push((question.key.clone(), picked));
                    }
                    ui.add_space(4.0);
                }
                for (key, picked) in changes {
                    if let Err(e) = self.questionnaire.select_answer(&key, picked) {
                        tracing::warn!("{e}");
                    }
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if self.questionnaire.can_go_previous() && ui.button("Previous").clicked() {
                        self.questionnaire.previous_page();
                    }
                    if self.questionnaire.can_go_next() && ui.button("Next").clicked() {
                        self.questionnaire.next_page();
                    }
                    if self.questionnaire.can_submit() {
                        let busy = self.questionnaire.is_submitting();
                        let label = if busy { "Submitting..." } else { "Submit" };
                        if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                            self.start_prediction(ui.ctx());
                        }
                    }
                });

                ui.add_space(16.0);
                ui.separator();
                let heading = ui.heading("Prediction Result");
                if self.scroll_to_result {
                    heading.scroll_to_me(Some(egui::Align::TOP));
                    self.scroll_to_result = false;
                }

                let busy = self.questionnaire.is_submitting();
                if busy {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading...");
                    });
                }
                let mut retry = false;
                match self.questionnaire.last_outcome() {
                    None if !busy => {
                        ui.weak("Answer the questions and submit to see your result.");
                    }
                    None => {}
                    Some(Ok(result)) => {
                        ui.label(result.message());
                        if let Some(at) = &self.prediction_checked_at {
                            ui.weak(format!("Received at {at}"));
                        }
                    }
                    Some(Err(err)) => retry = error_frame(ui, err) && !busy,
                }
                if retry {
                    self.start_prediction(ui.ctx());
                }
            });
    }

    fn start_prediction(&mut self, ctx: &egui::Context) {
        let request = match self.questionnaire.begin_submit() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("prediction not started: {e}");
                return;
            }
        };
        self.scroll_to_result = true;
        match self.client.clone() {
            Ok(client) => {
                self.prediction_rx = Some(spawn_job(ctx, move || client.predict(&request)));
            }
            Err(e) => self.questionnaire.finish_submit(Err(e)),
        }
    }
}
