//! Chest X-ray upload panel.

use super::{UiApp, error_frame, spawn_job};
use covidx_core::{IMAGE_EXTENSIONS, ImageFile, PredictionService, SubmitError};
use eframe::egui;
use rfd::FileDialog;
use std::path::Path;

const PREVIEW_SIZE: u32 = 300;

/// Preview of the selected image. The texture is freed when this is dropped.
pub(super) enum ImagePreview {
    Texture(egui::TextureHandle),
    Unavailable(String),
}

impl ImagePreview {
    fn load(ctx: &egui::Context, file: &ImageFile) -> Self {
        match image::load_from_memory(&file.bytes) {
            Ok(img) => {
                let thumb = img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE).to_rgba8();
                let size = [thumb.width() as usize, thumb.height() as usize];
                let color = egui::ColorImage::from_rgba_unmultiplied(size, thumb.as_raw());
                let name = format!("preview:{}", file.name);
                ImagePreview::Texture(ctx.load_texture(name, color, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                tracing::warn!("Failed to decode preview for {}: {}", file.name, e);
                ImagePreview::Unavailable(e.to_string())
            }
        }
    }
}

impl UiApp {
    pub(super) fn render_detection_panel(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading("COVID Detection");
            ui.label(
                "Upload your lung X-ray image and let our AI-powered system analyze it for signs of COVID.",
            );
            ui.add_space(12.0);

            ui.horizontal(|ui| {
                if ui.button("Choose image...").clicked()
                    && let Some(path) = FileDialog::new()
                        .add_filter("Images", IMAGE_EXTENSIONS)
                        .pick_file()
                {
                    self.select_image(ui.ctx(), &path);
                }
                match self.upload.selection() {
                    Some(sel) => ui.label(&sel.file.name),
                    None => ui.weak("No file chosen"),
                };
            });

            match self.upload.preview() {
                Some(ImagePreview::Texture(tex)) => {
                    ui.add_space(8.0);
                    let max = egui::Vec2::splat(PREVIEW_SIZE as f32);
                    ui.add(
                        egui::Image::from_texture(egui::load::SizedTexture::from_handle(tex))
                            .max_size(max)
                            .corner_radius(8.0),
                    );
                }
                Some(ImagePreview::Unavailable(reason)) => {
                    ui.weak(format!("Preview unavailable: {reason}"));
                }
                None => {}
            }

            ui.add_space(12.0);
            let busy = self.upload.is_submitting();
            let label = if busy {
                "Checking..."
            } else {
                "Check for COVID"
            };
            if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                self.start_detection(ui.ctx());
            }

            ui.add_space(12.0);
            if busy {
                ui.spinner();
            }
            let mut retry = false;
            match self.upload.last_outcome() {
                None => {}
                Some(Ok(message)) => {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.strong("Result");
                        ui.label(message);
                        if let Some(at) = &self.detection_checked_at {
                            ui.weak(format!("Checked at {at}"));
                        }
                    });
                }
                Some(Err(err)) => retry = error_frame(ui, err) && !busy,
            }
            if retry {
                self.start_detection(ui.ctx());
            }
        });
    }

    fn select_image(&mut self, ctx: &egui::Context, path: &Path) {
        match ImageFile::from_path(path) {
            Ok(file) => {
                let preview = ImagePreview::load(ctx, &file);
                self.upload.select_file(file, preview);
                self.status.clear();
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = format!("Could not open image: {e}");
            }
        }
    }

    fn start_detection(&mut self, ctx: &egui::Context) {
        let file = match self.upload.begin_submit() {
            Ok(file) => file,
            Err(SubmitError::NoFileSelected) => {
                self.show_no_file_notice = true;
                return;
            }
            Err(e) => {
                tracing::debug!("detection not started: {e}");
                return;
            }
        };
        match self.client.clone() {
            Ok(client) => {
                self.detection_rx = Some(spawn_job(ctx, move || client.detect(&file)));
            }
            Err(e) => self.upload.finish_submit(Err(e)),
        }
    }
}
