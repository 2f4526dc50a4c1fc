//! Desktop shell: panel switching, background submissions and shared widgets.

mod detection;
mod prediction;
mod settings;

use covidx_core::{
    HttpPredictionClient, PredictionResult, Questionnaire, ServiceConfig, SubmitError,
    UploadState,
};
use eframe::{App, Frame, egui};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use detection::ImagePreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Detection,
    Prediction,
    Settings,
}

pub(crate) struct UiApp {
    panel: Panel,
    status: String,
    config: ServiceConfig,
    pending_config: ServiceConfig,
    client: Result<HttpPredictionClient, SubmitError>,
    app_version: &'static str,

    upload: UploadState<ImagePreview>,
    show_no_file_notice: bool,
    detection_rx: Option<Receiver<Result<String, SubmitError>>>,
    detection_checked_at: Option<String>,

    questionnaire: Questionnaire,
    prediction_rx: Option<Receiver<Result<PredictionResult, SubmitError>>>,
    prediction_checked_at: Option<String>,
    scroll_to_result: bool,
}

impl UiApp {
    pub(crate) fn new(config: ServiceConfig) -> Self {
        let client = HttpPredictionClient::new(&config);
        if let Err(e) = &client {
            tracing::error!("{e}");
        }
        Self {
            panel: Panel::Detection,
            status: String::new(),
            pending_config: config.clone(),
            config,
            client,
            app_version: env!("COVIDX_VERSION"),
            upload: UploadState::default(),
            show_no_file_notice: false,
            detection_rx: None,
            detection_checked_at: None,
            questionnaire: Questionnaire::default(),
            prediction_rx: None,
            prediction_checked_at: None,
            scroll_to_result: false,
        }
    }

    /// Collects finished background submissions.
    fn poll_jobs(&mut self) {
        if let Some(outcome) = poll(&mut self.detection_rx) {
            if outcome.is_ok() {
                self.detection_checked_at = Some(timestamp());
            }
            self.upload.finish_submit(outcome);
        }
        if let Some(outcome) = poll(&mut self.prediction_rx) {
            if outcome.is_ok() {
                self.prediction_checked_at = Some(timestamp());
            }
            self.questionnaire.finish_submit(outcome);
        }
    }

    fn render_no_file_notice(&mut self, ctx: &egui::Context) {
        if !self.show_no_file_notice {
            return;
        }
        let modal = egui::Modal::new(egui::Id::new("no-file-notice")).show(ctx, |ui| {
            ui.set_width(280.0);
            ui.heading("No image selected");
            ui.add_space(6.0);
            ui.label(SubmitError::NoFileSelected.to_string());
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });
        if modal.inner || modal.should_close() {
            self.show_no_file_notice = false;
        }
    }
}

/// Runs `job` off the UI thread and wakes the UI when it finishes.
fn spawn_job<T, F>(ctx: &egui::Context, job: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let ctx = ctx.clone();
    thread::spawn(move || {
        // The receiver is gone only if the app has shut down.
        let _ = tx.send(job());
        ctx.request_repaint();
    });
    rx
}

fn poll<T>(slot: &mut Option<Receiver<Result<T, SubmitError>>>) -> Option<Result<T, SubmitError>> {
    let outcome = match slot.as_ref()?.try_recv() {
        Ok(outcome) => outcome,
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => Err(SubmitError::Network(
            "submission worker stopped unexpectedly".to_string(),
        )),
    };
    *slot = None;
    Some(outcome)
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Shows a failed submission. Returns true when the user asks to retry.
fn error_frame(ui: &mut egui::Ui, err: &SubmitError) -> bool {
    let mut retry = false;
    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, ui.visuals().error_fg_color))
        .show(ui, |ui| {
            ui.colored_label(ui.visuals().error_fg_color, err.to_string());
            if err.is_retryable() {
                retry = ui.button("Retry").clicked();
            }
        });
    retry
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.panel, Panel::Detection, "Detection");
                ui.selectable_value(&mut self.panel, Panel::Prediction, "Prediction");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.weak("© 2024 COVIDX. All rights reserved.");
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.panel {
            Panel::Detection => self.render_detection_panel(ui),
            Panel::Prediction => self.render_prediction_panel(ui),
            Panel::Settings => self.render_settings_panel(ui),
        });

        self.render_no_file_notice(ctx);
    }
}
